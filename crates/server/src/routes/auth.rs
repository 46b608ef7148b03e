//! Authentication route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use fairweather_core::{Email, User};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Credentials for login and registration.
///
/// Fields are optional so a missing field yields our own 400 message rather
/// than a deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of a password recovery request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecoverPasswordRequest {
    pub email: Option<String>,
}

/// Successful login or registration.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: User,
}

/// Validated credentials.
struct Credentials {
    email: Email,
    password: SecretString,
}

impl CredentialsRequest {
    fn validate(self) -> Result<Credentials> {
        let (Some(email), Some(password)) = (
            self.email.filter(|e| !e.trim().is_empty()),
            self.password.filter(|p| !p.trim().is_empty()),
        ) else {
            return Err(AppError::BadRequest(
                "Email and password are required.".to_string(),
            ));
        };

        let email = Email::parse(&email)
            .map_err(|_| AppError::BadRequest("Invalid email address.".to_string()))?;

        Ok(Credentials {
            email,
            password: SecretString::from(password),
        })
    }
}

/// Return the signed-in user.
pub async fn current_user(State(state): State<AppState>, session: Session) -> Response {
    match state.identity().current_user(&session).await {
        Some(user) => Json(user).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "No user is currently logged in." })),
        )
            .into_response(),
    }
}

/// Handle login.
#[tracing::instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(body) = body?;
    let credentials = body.validate()?;

    let user = state
        .identity()
        .login(&session, &credentials.email, &credentials.password)
        .await?;

    Ok(Json(AuthResponse {
        message: "Login successful.",
        user,
    }))
}

/// Handle registration.
#[tracing::instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(body) = body?;
    let credentials = body.validate()?;

    let user = state
        .identity()
        .register(&session, &credentials.email, &credentials.password)
        .await?;

    Ok(Json(AuthResponse {
        message: "Registration successful.",
        user,
    }))
}

/// Handle logout.
#[tracing::instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    state.identity().logout(&session).await?;

    Ok(Json(json!({ "message": "Logout successful." })))
}

/// Handle a password recovery request.
#[tracing::instrument(skip(state, body))]
pub async fn recover_password(
    State(state): State<AppState>,
    body: std::result::Result<Json<RecoverPasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = body?;

    let Some(email) = body.email.filter(|e| !e.trim().is_empty()) else {
        return Err(AppError::BadRequest(
            "Email is required for password recovery.".to_string(),
        ));
    };
    let email = Email::parse(&email)
        .map_err(|_| AppError::BadRequest("Invalid email address.".to_string()))?;

    state.identity().send_password_recovery(&email).await?;

    Ok(Json(json!({ "message": "Password recovery email sent." })))
}
