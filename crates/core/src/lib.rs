//! Fairweather Core - Shared types library.
//!
//! This crate provides common types used across all Fairweather components:
//! - `server` - HTTP API for authentication and favorite cities
//! - `client` - Remote-call wrapper used by front-ends
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes for emails, user IDs and city names, plus
//!   the `User` and `FavoriteCity` records exchanged over the wire

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
