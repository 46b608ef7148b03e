//! Domain models for the server.
//!
//! Shared records (`User`, `FavoriteCity`) live in `fairweather-core`; this
//! module holds what only the server stores.

pub mod session;

pub use session::{AuthSession, SessionTokens, keys as session_keys};
