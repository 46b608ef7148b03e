//! Client error types.

use thiserror::Error;

/// Errors returned by [`crate::FairweatherClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server has no signed-in user for this client's session.
    #[error("not authenticated")]
    Unauthorized,

    /// The server rejected the input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other non-success status.
    #[error("server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// The request could not be sent or the response could not be read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL or a derived endpoint URL is invalid.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}
