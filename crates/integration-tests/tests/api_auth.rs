//! Auth API tests against the in-process router.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use fairweather_integration_tests::{CLIENT_ORIGIN, TestApp};

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let mut session = app.session();

    let resp = session.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");

    let resp = session.get("/health/ready").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_current_user_requires_session() {
    let app = TestApp::new();
    let resp = app.session().get("/api/auth/current-user").await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "No user is currently logged in.");
}

#[tokio::test]
async fn test_register_signs_in() {
    let app = TestApp::new();
    let mut session = app.session();

    let resp = session.register("a@x.com", "pw1").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Registration successful.");
    assert_eq!(resp.body["user"]["email"], "a@x.com");
    assert!(session.has_cookie());

    let resp = session.get("/api/auth/current-user").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["email"], "a@x.com");
    assert!(resp.body["id"].is_string());
}

#[tokio::test]
async fn test_duplicate_registration_is_bad_request() {
    let app = TestApp::new();
    app.session().register("a@x.com", "pw1").await;

    let resp = app.session().register("a@x.com", "pw2").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Registration failed. Please try again.");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new();
    app.session().register("a@x.com", "pw1").await;

    let mut session = app.session();
    let resp = session.login("a@x.com", "wrong").await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "Invalid email or password.");
    assert_eq!(
        session.get("/api/auth/current-user").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_login_requires_email_and_password() {
    let app = TestApp::new();
    let mut session = app.session();

    let resp = session
        .post_json("/api/auth/login", json!({ "email": "a@x.com" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Email and password are required.");

    let resp = session
        .post_json("/api/auth/login", json!({ "email": "", "password": "pw1" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = session.register("ws@x.com", "   ").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Email and password are required.");
    assert!(!session.has_cookie());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let mut session = app.session();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = session.send(request).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body["message"].is_string());

    let resp = session.post("/api/auth/register").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::new();
    let mut session = app.session();
    session.register("a@x.com", "pw1").await;
    assert_eq!(app.identity.active_token_count().await, 1);

    let resp = session.post("/api/auth/logout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Logout successful.");
    assert_eq!(app.identity.active_token_count().await, 0);

    assert_eq!(
        session.get("/api/auth/current-user").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = TestApp::new();
    let resp = app.session().post("/api/auth/logout").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_recover_password() {
    let app = TestApp::new();
    let mut session = app.session();

    let resp = session
        .post_json("/api/auth/recover-password", json!({ "email": "a@x.com" }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Password recovery email sent.");

    let resp = session
        .post_json("/api/auth/recover-password", json!({}))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body["message"],
        "Email is required for password recovery."
    );

    assert_eq!(app.identity.recovery_requests().await.len(), 1);
}

#[tokio::test]
async fn test_sessions_do_not_share_user() {
    let app = TestApp::new();
    let mut alice = app.session();
    let mut bob = app.session();

    alice.register("alice@x.com", "pw").await;
    bob.register("bob@x.com", "pw").await;

    assert_eq!(
        alice.get("/api/auth/current-user").await.body["email"],
        "alice@x.com"
    );
    assert_eq!(
        bob.get("/api/auth/current-user").await.body["email"],
        "bob@x.com"
    );
}

#[tokio::test]
async fn test_cors_allows_client_origin_with_credentials() {
    let app = TestApp::new();
    let mut session = app.session();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/favorites")
        .header(header::ORIGIN, CLIENT_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .body(Body::empty())
        .unwrap();
    let resp = session.send(request).await;

    assert_eq!(
        resp.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        CLIENT_ORIGIN
    );
    assert_eq!(
        resp.headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn test_cors_ignores_other_origins() {
    let app = TestApp::new();
    let mut session = app.session();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = session.send(request).await;

    assert!(
        resp.headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let mut session = app.session();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let resp = session.send(request).await;
    assert_eq!(resp.headers["x-request-id"], "req-123");

    let resp = session.get("/health").await;
    assert!(resp.headers.contains_key("x-request-id"));
}
