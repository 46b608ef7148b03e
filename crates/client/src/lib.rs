//! Fairweather API client.
//!
//! Thin HTTP client for the Fairweather server. The server identifies the
//! user by a session cookie, which the client keeps in its cookie store
//! between calls. Sign-in state changes are published on a
//! [`tokio::sync::watch`] channel; see [`FairweatherClient::subscribe`].

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod error;

pub use client::{AuthState, FairweatherClient};
pub use error::ClientError;
