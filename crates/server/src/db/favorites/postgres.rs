//! `PostgreSQL` favorites repository.

use async_trait::async_trait;
use sqlx::PgPool;

use fairweather_core::{CityName, FavoriteCity, UserId};

use super::FavoritesStore;
use crate::db::RepositoryError;

/// Favorites stored in `fairweather.favorite_city`.
#[derive(Clone)]
pub struct PgFavoritesStore {
    pool: PgPool,
}

impl PgFavoritesStore {
    /// Create a new favorites repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FavoritesStore for PgFavoritesStore {
    async fn is_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM fairweather.favorite_city
                WHERE user_id = $1 AND city = $2
            )
            ",
        )
        .bind(user_id)
        .bind(city)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn add_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<FavoriteCity, RepositoryError> {
        // Insert-if-absent: no row back means the city was already there.
        let row = sqlx::query_as::<_, FavoriteCity>(
            r"
            INSERT INTO fairweather.favorite_city (user_id, city)
            VALUES ($1, $2)
            ON CONFLICT (user_id, city) DO NOTHING
            RETURNING user_id, city, is_home, added_at
            ",
        )
        .bind(user_id)
        .bind(city)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::Conflict(format!("{city} is already a favorite")))
    }

    async fn list_favorites(&self, user_id: &UserId) -> Result<Vec<FavoriteCity>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteCity>(
            r"
            SELECT user_id, city, is_home, added_at
            FROM fairweather.favorite_city
            WHERE user_id = $1
            ORDER BY added_at ASC, city ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn remove_favorite(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM fairweather.favorite_city
            WHERE user_id = $1 AND city = $2
            ",
        )
        .bind(user_id)
        .bind(city)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_home_city(
        &self,
        user_id: &UserId,
        city: &CityName,
    ) -> Result<FavoriteCity, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serialize home changes per user so the partial unique index never trips.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            UPDATE fairweather.favorite_city
            SET is_home = FALSE, updated_at = NOW()
            WHERE user_id = $1 AND is_home AND city <> $2
            ",
        )
        .bind(user_id)
        .bind(city)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, FavoriteCity>(
            r"
            INSERT INTO fairweather.favorite_city (user_id, city, is_home)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (user_id, city) DO UPDATE
                SET is_home = TRUE, updated_at = NOW()
            RETURNING user_id, city, is_home, added_at
            ",
        )
        .bind(user_id)
        .bind(city)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row)
    }

    async fn get_home_city(
        &self,
        user_id: &UserId,
    ) -> Result<Option<FavoriteCity>, RepositoryError> {
        let row = sqlx::query_as::<_, FavoriteCity>(
            r"
            SELECT user_id, city, is_home, added_at
            FROM fairweather.favorite_city
            WHERE user_id = $1 AND is_home
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn remove_home_city(&self, user_id: &UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE fairweather.favorite_city
            SET is_home = FALSE, updated_at = NOW()
            WHERE user_id = $1 AND is_home
            ",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
