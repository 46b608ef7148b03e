//! In-process favorites store.
//!
//! Used when no database is configured and by tests. Each operation runs
//! under one write lock, which makes check-and-write sequences atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use fairweather_core::{CityName, FavoriteCity, UserId};

use super::FavoritesStore;
use crate::db::RepositoryError;

/// Favorites kept in memory, per user, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryFavoritesStore {
    users: RwLock<HashMap<UserId, Vec<FavoriteCity>>>,
}

impl MemoryFavoritesStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesStore for MemoryFavoritesStore {
    async fn is_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<bool, RepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .is_some_and(|favorites| favorites.iter().any(|f| &f.city == city)))
    }

    async fn add_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<FavoriteCity, RepositoryError> {
        let mut users = self.users.write().await;
        let favorites = users.entry(user_id.clone()).or_default();

        if favorites.iter().any(|f| &f.city == city) {
            return Err(RepositoryError::Conflict(format!(
                "{city} is already a favorite"
            )));
        }

        let favorite = FavoriteCity::new(user_id.clone(), city.clone());
        favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn list_favorites(&self, user_id: &UserId) -> Result<Vec<FavoriteCity>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned().unwrap_or_default())
    }

    async fn remove_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        let Some(favorites) = users.get_mut(user_id) else {
            return Ok(false);
        };

        let before = favorites.len();
        favorites.retain(|f| &f.city != city);
        Ok(favorites.len() < before)
    }

    async fn set_home_city(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<FavoriteCity, RepositoryError> {
        let mut users = self.users.write().await;
        let favorites = users.entry(user_id.clone()).or_default();

        for favorite in favorites.iter_mut() {
            favorite.is_home = &favorite.city == city;
        }

        if let Some(existing) = favorites.iter().find(|f| &f.city == city) {
            return Ok(existing.clone());
        }

        let mut favorite = FavoriteCity::new(user_id.clone(), city.clone());
        favorite.is_home = true;
        favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn get_home_city(
        &self,
        user_id: &UserId,
    ) -> Result<Option<FavoriteCity>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .and_then(|favorites| favorites.iter().find(|f| f.is_home).cloned()))
    }

    async fn remove_home_city(&self, user_id: &UserId) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        let Some(favorites) = users.get_mut(user_id) else {
            return Ok(false);
        };

        let mut cleared = false;
        for favorite in favorites.iter_mut().filter(|f| f.is_home) {
            favorite.is_home = false;
            cleared = true;
        }
        Ok(cleared)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
