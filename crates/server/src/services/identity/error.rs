//! Identity error types.

use thiserror::Error;

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The provider refused the registration (duplicate account, weak password, ...).
    #[error("registration failed: {0}")]
    RegistrationFailed(String),

    /// The provider answered with an unexpected error status.
    #[error("identity provider error: {status} - {message}")]
    Provider { status: u16, message: String },

    /// The provider could not be reached.
    #[error("identity provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a body we could not interpret.
    #[error("unexpected identity provider response: {0}")]
    UnexpectedResponse(String),

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
