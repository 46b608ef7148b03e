//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, capture 5xx)
//! 2. CORS (single client origin, credentials allowed)
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (add unique ID to each request)
//! 5. Session layer (tower-sessions)

pub mod auth;
pub mod cors;
pub mod request_id;
pub mod session;

pub use auth::RequireAuth;
pub use cors::create_cors_layer;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
