//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server errors are captured to
//! Sentry before responding; every error body is JSON `{message, error?}` with
//! `error` only present on 500 responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::IdentityError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid input.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No signed-in user.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identity provider or session failure.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Identity(err) => match err {
                IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                IdentityError::RegistrationFailed(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(err) => match err {
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message.
    fn message(&self) -> String {
        match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Conflict(msg)
            | Self::NotFound(msg) => msg.clone(),
            Self::Identity(IdentityError::InvalidCredentials) => {
                "Invalid email or password.".to_string()
            }
            Self::Identity(IdentityError::RegistrationFailed(_)) => {
                "Registration failed. Please try again.".to_string()
            }
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(RepositoryError::NotFound) => "Not found.".to_string(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            ErrorBody {
                message: self.message(),
                error: Some(self.to_string()),
            }
        } else {
            if let Self::Identity(IdentityError::RegistrationFailed(reason)) = &self {
                tracing::info!(%reason, "registration refused by provider");
            }
            ErrorBody {
                message: self.message(),
                error: None,
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
