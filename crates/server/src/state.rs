//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::FavoritesStore;
use crate::services::{IdentityGateway, IdentityProvider};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds no per-user data; the signed-in user
/// lives in each request's session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    identity: IdentityGateway,
    favorites: Arc<dyn FavoritesStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `identity_provider` - Provider behind the identity gateway
    /// * `favorites` - Favorites persistence
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        favorites: Arc<dyn FavoritesStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                identity: IdentityGateway::new(identity_provider),
                favorites,
            }),
        }
    }

    /// Get a reference to the identity gateway.
    #[must_use]
    pub fn identity(&self) -> &IdentityGateway {
        &self.inner.identity
    }

    /// Get a reference to the favorites store.
    #[must_use]
    pub fn favorites(&self) -> &dyn FavoritesStore {
        self.inner.favorites.as_ref()
    }
}
