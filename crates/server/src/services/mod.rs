//! Business logic services for the server.
//!
//! # Services
//!
//! - `identity` - Authentication via an external identity provider, with the
//!   signed-in user kept in the per-request session

pub mod identity;

pub use identity::{
    GoTrueProvider, IdentityError, IdentityGateway, IdentityProvider, MemoryIdentityProvider,
};
