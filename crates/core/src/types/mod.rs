//! Core types for Fairweather.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod city;
pub mod email;
pub mod favorite;
pub mod id;
pub mod user;

pub use city::{CityName, CityNameError};
pub use email::{Email, EmailError};
pub use favorite::FavoriteCity;
pub use id::UserId;
pub use user::User;
