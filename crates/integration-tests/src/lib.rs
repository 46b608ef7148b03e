//! Integration tests for Fairweather.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process API tests (no external services)
//! cargo test -p fairweather-integration-tests
//!
//! # Also run tests against PostgreSQL and a live server
//! FAIRWEATHER_DATABASE_URL=postgres://... FAIRWEATHER_TEST_URL=http://localhost:8080 \
//!     cargo test -p fairweather-integration-tests -- --include-ignored
//! ```
//!
//! The harness builds the production router with in-memory backends and
//! drives it with `tower::ServiceExt::oneshot`, carrying the session cookie
//! between requests like a browser would.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use fairweather_core::{CityName, FavoriteCity, UserId};
use fairweather_server::build_router;
use fairweather_server::config::ServerConfig;
use fairweather_server::db::{FavoritesStore, MemoryFavoritesStore, RepositoryError};
use fairweather_server::middleware::{create_cors_layer, create_session_layer};
use fairweather_server::services::MemoryIdentityProvider;
use fairweather_server::state::AppState;

/// Origin allowed by the test router's CORS policy.
pub const CLIENT_ORIGIN: &str = "http://localhost:5162";

/// Server configuration used by the test router.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:8080".to_string(),
        client_origin: CLIENT_ORIGIN.to_string(),
        database_url: None,
        identity: None,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Favorites store that counts calls before delegating to memory.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryFavoritesStore,
    calls: AtomicUsize,
}

impl CountingStore {
    /// Number of store operations performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl FavoritesStore for CountingStore {
    async fn is_favorite(&self, user_id: &UserId, city: &CityName) -> Result<bool, RepositoryError> {
        self.touch();
        self.inner.is_favorite(user_id, city).await
    }

    async fn add_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<FavoriteCity, RepositoryError> {
        self.touch();
        self.inner.add_favorite(user_id, city).await
    }

    async fn list_favorites(&self, user_id: &UserId) -> Result<Vec<FavoriteCity>, RepositoryError> {
        self.touch();
        self.inner.list_favorites(user_id).await
    }

    async fn remove_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<bool, RepositoryError> {
        self.touch();
        self.inner.remove_favorite(user_id, city).await
    }

    async fn set_home_city(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<FavoriteCity, RepositoryError> {
        self.touch();
        self.inner.set_home_city(user_id, city).await
    }

    async fn get_home_city(
        &self,
        user_id: &UserId,
    ) -> Result<Option<FavoriteCity>, RepositoryError> {
        self.touch();
        self.inner.get_home_city(user_id).await
    }

    async fn remove_home_city(&self, user_id: &UserId) -> Result<bool, RepositoryError> {
        self.touch();
        self.inner.remove_home_city(user_id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }
}

/// The full application wired to in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub identity: Arc<MemoryIdentityProvider>,
    pub favorites: Arc<CountingStore>,
}

impl TestApp {
    /// Build the router with in-memory identity, favorites and sessions.
    #[must_use]
    pub fn new() -> Self {
        let config = test_config();
        let identity = Arc::new(MemoryIdentityProvider::with_minimal_hashing_cost());
        let favorites = Arc::new(CountingStore::default());

        let state = AppState::new(identity.clone(), favorites.clone());
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let cors = create_cors_layer(&config.client_origin).expect("valid origin");

        Self {
            router: build_router(state, session_layer, cors),
            identity,
            favorites,
        }
    }

    /// A new browser-like session with no cookie.
    #[must_use]
    pub fn session(&self) -> TestSession {
        TestSession {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Response captured by [`TestSession`].
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// One client's conversation with the router.
///
/// Clones share the current cookie, like tabs of one browser.
#[derive(Clone)]
pub struct TestSession {
    router: Router,
    cookie: Option<String>,
}

impl TestSession {
    /// Send a request, optionally with a JSON body, and record any session cookie.
    pub async fn request(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send(request).await
    }

    /// Send a prebuilt request (cookie not added).
    pub async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            self.cookie = if set_cookie.contains("Max-Age=0") {
                None
            } else {
                set_cookie.split(';').next().map(str::to_owned)
            };
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str) -> TestResponse {
        self.request(Method::POST, uri, None).await
    }

    pub async fn post_json(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Register a user and keep the resulting session.
    pub async fn register(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/auth/register",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Log in and keep the resulting session.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/auth/login",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Whether the session currently carries a cookie.
    #[must_use]
    pub const fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }
}
