//! Favorite city record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CityName, UserId};

/// A city a user has marked as a favorite.
///
/// At most one of a user's favorites has `is_home` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct FavoriteCity {
    /// Owner of this entry.
    pub user_id: UserId,
    /// City name, unique per user.
    pub city: CityName,
    /// Whether this is the user's home city.
    pub is_home: bool,
    /// When the city was first added.
    pub added_at: DateTime<Utc>,
}

impl FavoriteCity {
    /// A new, non-home favorite added now.
    #[must_use]
    pub fn new(user_id: UserId, city: CityName) -> Self {
        Self {
            user_id,
            city,
            is_home: false,
            added_at: Utc::now(),
        }
    }
}
