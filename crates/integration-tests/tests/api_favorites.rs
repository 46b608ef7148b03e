//! Favorites API tests against the in-process router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};

use fairweather_integration_tests::{TestApp, TestSession};

async fn signed_in(app: &TestApp, email: &str) -> TestSession {
    let mut session = app.session();
    let resp = session.register(email, "pw1").await;
    assert_eq!(resp.status, StatusCode::OK);
    session
}

#[tokio::test]
async fn test_unauthenticated_requests_never_reach_store() {
    let app = TestApp::new();
    let mut anonymous = app.session();

    let requests = [
        (Method::GET, "/api/favorites"),
        (Method::POST, "/api/favorites/Paris"),
        (Method::GET, "/api/favorites/Paris"),
        (Method::DELETE, "/api/favorites/Paris"),
        (Method::POST, "/api/favorites/Paris/home"),
        (Method::GET, "/api/favorites/home"),
        (Method::POST, "/api/favorites/home"),
        (Method::DELETE, "/api/favorites/home"),
    ];

    for (method, uri) in requests {
        let resp = anonymous.request(method.clone(), uri, None).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(resp.body["message"], "User not authenticated.");
    }

    assert_eq!(app.favorites.calls(), 0);
}

#[tokio::test]
async fn test_home_city_scenario() {
    let app = TestApp::new();
    let mut session = app.session();

    assert_eq!(session.register("a@x.com", "pw1").await.status, StatusCode::OK);
    assert_eq!(session.login("a@x.com", "pw1").await.status, StatusCode::OK);

    let resp = session.post("/api/favorites/Paris").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Paris added to favorites.");
    assert_eq!(resp.body["favorite"]["city"], "Paris");

    let resp = session.post("/api/favorites/Paris/home").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Paris is now your home city.");

    let resp = session.get("/api/favorites/home").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["city"], "Paris");
    assert_eq!(resp.body["isHome"], true);

    let resp = session.delete("/api/favorites/home").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Home city has been removed.");

    let resp = session.get("/api/favorites/home").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["message"], "No home city set.");

    // Clearing the home flag keeps the favorite.
    let resp = session.get("/api/favorites").await;
    assert_eq!(resp.body.as_array().unwrap().len(), 1);
    assert_eq!(resp.body[0]["isHome"], false);
}

#[tokio::test]
async fn test_add_then_list_contains_city_once() {
    let app = TestApp::new();
    let mut session = signed_in(&app, "a@x.com").await;

    session.post("/api/favorites/Lima").await;
    session.post("/api/favorites/Accra").await;

    let resp = session.get("/api/favorites").await;
    assert_eq!(resp.status, StatusCode::OK);
    let cities: Vec<&str> = resp
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["city"].as_str().unwrap())
        .collect();
    assert_eq!(cities, ["Lima", "Accra"]);
}

#[tokio::test]
async fn test_duplicate_add_conflicts() {
    let app = TestApp::new();
    let mut session = signed_in(&app, "a@x.com").await;

    assert_eq!(session.post("/api/favorites/Paris").await.status, StatusCode::OK);

    let resp = session.post("/api/favorites/Paris").await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["message"], "Paris is already in your favorites.");
    assert!(resp.body.get("error").is_none());
}

#[tokio::test]
async fn test_concurrent_adds_only_one_succeeds() {
    let app = TestApp::new();
    let session = signed_in(&app, "a@x.com").await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let mut task_session = session.clone();
            tokio::spawn(async move { task_session.post("/api/favorites/Oslo").await.status })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::CONFLICT)
            .count(),
        7
    );
}

#[tokio::test]
async fn test_set_home_moves_flag() {
    let app = TestApp::new();
    let mut session = signed_in(&app, "a@x.com").await;

    session.post("/api/favorites/Rome/home").await;
    session.post("/api/favorites/Turin/home").await;

    let resp = session.get("/api/favorites/home").await;
    assert_eq!(resp.body["city"], "Turin");

    let resp = session.get("/api/favorites/Rome").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["isFavorite"], true);

    let favorites = session.get("/api/favorites").await.body;
    let homes = favorites
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["isHome"] == true)
        .count();
    assert_eq!(homes, 1);
}

#[tokio::test]
async fn test_remove_absent_favorite_succeeds() {
    let app = TestApp::new();
    let mut session = signed_in(&app, "a@x.com").await;

    let resp = session.delete("/api/favorites/Atlantis").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Atlantis removed from favorites.");

    session.post("/api/favorites/Paris").await;
    session.delete("/api/favorites/Paris").await;
    let resp = session.get("/api/favorites/Paris").await;
    assert_eq!(resp.body["isFavorite"], false);
}

#[tokio::test]
async fn test_city_names_are_percent_decoded_and_trimmed() {
    let app = TestApp::new();
    let mut session = signed_in(&app, "a@x.com").await;

    let resp = session.post("/api/favorites/%20New%20York%20").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["favorite"]["city"], "New York");

    let resp = session.get("/api/favorites/New%20York").await;
    assert_eq!(resp.body["isFavorite"], true);
}

#[tokio::test]
async fn test_invalid_city_is_bad_request() {
    let app = TestApp::new();
    let mut session = signed_in(&app, "a@x.com").await;

    let resp = session.post("/api/favorites/%20%20").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "City name cannot be empty.");

    let resp = session.post("/api/favorites/%2E%2E").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "City name cannot be \".\" or \"..\".");

    let long = "x".repeat(101);
    let resp = session.post(&format!("/api/favorites/{long}/home")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_are_isolated() {
    let app = TestApp::new();
    let mut alice = signed_in(&app, "alice@x.com").await;
    let mut bob = signed_in(&app, "bob@x.com").await;

    alice.post("/api/favorites/Paris/home").await;

    let resp = bob.get("/api/favorites").await;
    assert_eq!(resp.body.as_array().unwrap().len(), 0);
    assert_eq!(
        bob.get("/api/favorites/home").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(bob.get("/api/favorites/Paris").await.body["isFavorite"], false);

    // Same city for another user is not a conflict.
    assert_eq!(bob.post("/api/favorites/Paris").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_favorites_survive_logout_and_login() {
    let app = TestApp::new();
    let mut session = signed_in(&app, "a@x.com").await;
    session.post("/api/favorites/Quito").await;

    session.post("/api/auth/logout").await;
    assert_eq!(
        session.get("/api/favorites").await.status,
        StatusCode::UNAUTHORIZED
    );

    session.login("a@x.com", "pw1").await;
    let resp = session.get("/api/favorites").await;
    assert_eq!(resp.body[0]["city"], "Quito");
}

#[tokio::test]
async fn test_home_cannot_be_added_as_city() {
    let app = TestApp::new();
    let mut session = signed_in(&app, "a@x.com").await;

    let resp = session.post("/api/favorites/home").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body["message"],
        "\"home\" is reserved and cannot be added as a favorite."
    );

    let resp = session.get("/api/favorites").await;
    assert_eq!(resp.body.as_array().unwrap().len(), 0);
}
