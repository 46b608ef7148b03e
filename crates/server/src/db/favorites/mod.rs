//! Favorite city storage.
//!
//! Every operation is keyed by the owning user's ID. Implementations must make
//! `add_favorite` a single insert-if-absent and `set_home_city` a single atomic
//! unit, so concurrent requests from the same user cannot produce duplicates
//! or two home cities.

mod memory;
mod postgres;

use async_trait::async_trait;

use fairweather_core::{CityName, FavoriteCity, UserId};

use super::RepositoryError;

pub use memory::MemoryFavoritesStore;
pub use postgres::PgFavoritesStore;

/// Storage for a user's favorite cities and home city.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Whether `city` is one of the user's favorites.
    async fn is_favorite(&self, user_id: &UserId, city: &CityName)
    -> Result<bool, RepositoryError>;

    /// Add `city` to the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the city is already a favorite.
    async fn add_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<FavoriteCity, RepositoryError>;

    /// All of the user's favorites, oldest first.
    async fn list_favorites(&self, user_id: &UserId) -> Result<Vec<FavoriteCity>, RepositoryError>;

    /// Remove `city` from the user's favorites. Returns `false` if it was absent.
    async fn remove_favorite(&self, user_id: &UserId, city: &CityName)
    -> Result<bool, RepositoryError>;

    /// Make `city` the user's only home city, adding it as a favorite if needed.
    async fn set_home_city(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<FavoriteCity, RepositoryError>;

    /// The user's home city, if one is set.
    async fn get_home_city(&self, user_id: &UserId)
    -> Result<Option<FavoriteCity>, RepositoryError>;

    /// Clear the home flag. The favorite itself is kept. Returns `false` if no
    /// home city was set.
    async fn remove_home_city(&self, user_id: &UserId) -> Result<bool, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
