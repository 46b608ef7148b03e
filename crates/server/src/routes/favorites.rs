//! Favorite city route handlers.
//!
//! Every handler takes [`RequireAuth`], so anonymous requests get 401 before
//! the store is touched.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;

use fairweather_core::{CityName, FavoriteCity};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Response for add and set-home.
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub message: String,
    pub favorite: FavoriteCity,
}

/// Response for a favorite membership check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsFavoriteResponse {
    pub city: CityName,
    pub is_favorite: bool,
}

fn parse_city(raw: &str) -> Result<CityName> {
    CityName::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Add a city to the user's favorites.
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(city): Path<String>,
) -> Result<Json<FavoriteResponse>> {
    let city = parse_city(&city)?;

    let favorite = state
        .favorites()
        .add_favorite(&auth.user.id, &city)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict(format!("{city} is already in your favorites."))
            }
            other => other.into(),
        })?;

    Ok(Json(FavoriteResponse {
        message: format!("{city} added to favorites."),
        favorite,
    }))
}

/// List the user's favorites, oldest first.
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Vec<FavoriteCity>>> {
    let favorites = state.favorites().list_favorites(&auth.user.id).await?;
    Ok(Json(favorites))
}

/// Whether a city is one of the user's favorites.
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn is_favorite(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(city): Path<String>,
) -> Result<Json<IsFavoriteResponse>> {
    let city = parse_city(&city)?;
    let is_favorite = state.favorites().is_favorite(&auth.user.id, &city).await?;

    Ok(Json(IsFavoriteResponse { city, is_favorite }))
}

/// Remove a city from the user's favorites. Removing an absent city succeeds.
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse> {
    // An unparseable name can never have been stored.
    if let Ok(city) = CityName::parse(&raw) {
        let removed = state
            .favorites()
            .remove_favorite(&auth.user.id, &city)
            .await?;
        tracing::debug!(removed, "remove favorite");
    }

    Ok(Json(json!({
        "message": format!("{} removed from favorites.", raw.trim())
    })))
}

/// Make a city the user's home city, adding it to favorites if needed.
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn set_home(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(city): Path<String>,
) -> Result<Json<FavoriteResponse>> {
    let city = parse_city(&city)?;
    let favorite = state.favorites().set_home_city(&auth.user.id, &city).await?;

    Ok(Json(FavoriteResponse {
        message: format!("{city} is now your home city."),
        favorite,
    }))
}

/// Return the user's home city.
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn get_home(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<FavoriteCity>> {
    state
        .favorites()
        .get_home_city(&auth.user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No home city set.".to_string()))
}

/// `POST /home` would read as adding a city named "home", which the route
/// table cannot address.
#[allow(clippy::unused_async)]
pub async fn add_reserved_home(RequireAuth(_): RequireAuth) -> AppError {
    AppError::BadRequest("\"home\" is reserved and cannot be added as a favorite.".to_string())
}

/// Clear the home city designation. The city stays a favorite.
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn remove_home(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<impl IntoResponse> {
    let cleared = state.favorites().remove_home_city(&auth.user.id).await?;
    tracing::debug!(cleared, "remove home city");

    Ok(Json(json!({ "message": "Home city has been removed." })))
}
