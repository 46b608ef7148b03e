//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (favorites store)
//!
//! # Auth
//! GET    /api/auth/current-user       - Signed-in user
//! POST   /api/auth/login              - Sign in
//! POST   /api/auth/register           - Create account and sign in
//! POST   /api/auth/logout             - Sign out
//! POST   /api/auth/recover-password   - Send password recovery email
//!
//! # Favorites (requires auth)
//! GET    /api/favorites               - List favorites
//! GET    /api/favorites/home          - Home city
//! DELETE /api/favorites/home          - Clear home city designation
//! POST   /api/favorites/home          - 400, "home" is reserved
//! POST   /api/favorites/{city}        - Add favorite
//! GET    /api/favorites/{city}        - Whether city is a favorite
//! DELETE /api/favorites/{city}        - Remove favorite
//! POST   /api/favorites/{city}/home   - Set home city
//! ```
//!
//! `home` is a static segment and wins over `{city}`, so a city literally
//! named "home" cannot be addressed through the single-segment routes.

pub mod auth;
pub mod favorites;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/current-user", get(auth::current_user))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/recover-password", post(auth::recover_password))
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::list))
        .route(
            "/home",
            get(favorites::get_home)
                .post(favorites::add_reserved_home)
                .delete(favorites::remove_home),
        )
        .route(
            "/{city}",
            get(favorites::is_favorite)
                .post(favorites::add)
                .delete(favorites::remove),
        )
        .route("/{city}/home", post(favorites::set_home))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/favorites", favorites_routes())
}
