//! Authentication extractor.
//!
//! Favorites handlers take [`RequireAuth`], so an anonymous request is
//! rejected before any handler code or store access runs.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::AuthSession;
use crate::services::identity::current_session;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.email)
/// }
/// ```
pub struct RequireAuth(pub AuthSession);

/// Rejection for requests without a signed-in user.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "User not authenticated." })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let auth = current_session(session).await.ok_or(AuthRejection)?;
        tracing::Span::current().record("user_id", tracing::field::display(&auth.user.id));

        Ok(Self(auth))
    }
}
