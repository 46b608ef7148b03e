//! Cross-origin policy for the browser client.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

use crate::config::ConfigError;

/// Allow credentialed requests from exactly one origin.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if `origin` is not a valid header value.
pub fn create_cors_layer(origin: &str) -> Result<CorsLayer, ConfigError> {
    let origin = HeaderValue::from_str(origin).map_err(|e| {
        ConfigError::InvalidEnvVar("FAIRWEATHER_CLIENT_ORIGIN".to_string(), e.to_string())
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
}
