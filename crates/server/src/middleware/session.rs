//! Session middleware configuration.
//!
//! The store is chosen at startup: `PostgresStore` when a database is
//! configured, `MemoryStore` otherwise.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::ServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "fw_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// The client runs on a different origin, so the cookie is `SameSite=None`
/// when served over HTTPS and `Lax` otherwise (browsers reject insecure
/// `SameSite=None` cookies).
#[must_use]
pub fn create_session_layer<S>(store: S, config: &ServerConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    let is_secure = config.is_secure();
    let same_site = if is_secure {
        tower_sessions::cookie::SameSite::None
    } else {
        tower_sessions::cookie::SameSite::Lax
    };

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(same_site)
        .with_http_only(true)
        .with_path("/")
}
