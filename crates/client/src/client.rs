//! HTTP client for the Fairweather API.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tokio::sync::watch;
use url::Url;

use fairweather_core::{CityName, FavoriteCity, User};

use crate::error::ClientError;

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sign-in state as last observed by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    SignedOut,
    SignedIn(User),
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: User,
}

#[derive(Debug, Deserialize)]
struct FavoriteResponse {
    favorite: FavoriteCity,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IsFavoriteResponse {
    is_favorite: bool,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// Client for one user's session with a Fairweather server.
///
/// Holds the session cookie, so each instance acts as one signed-in (or
/// anonymous) user.
pub struct FairweatherClient {
    http: reqwest::Client,
    base_url: Url,
    auth_state: watch::Sender<AuthState>,
}

impl FairweatherClient {
    /// Create a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let (auth_state, _) = watch::channel(AuthState::SignedOut);

        Ok(Self {
            http,
            base_url,
            auth_state,
        })
    }

    /// Subscribe to sign-in state changes.
    ///
    /// The receiver starts at the current state and is notified whenever it
    /// changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.auth_state.subscribe()
    }

    /// The sign-in state as last observed.
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.auth_state.borrow().clone()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Sign in. Returns `false` if the server refused.
    ///
    /// # Errors
    ///
    /// Returns error only if the request could not be completed.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, ClientError> {
        self.authenticate("api/auth/login", email, password).await
    }

    /// Register and sign in. Returns `false` if the server refused.
    ///
    /// # Errors
    ///
    /// Returns error only if the request could not be completed.
    pub async fn register(&self, email: &str, password: &str) -> Result<bool, ClientError> {
        self.authenticate("api/auth/register", email, password).await
    }

    async fn authenticate(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<bool, ClientError> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), path, "authentication refused");
            return Ok(false);
        }

        let body: AuthResponse = response.json().await?;
        self.publish(AuthState::SignedIn(body.user));
        Ok(true)
    }

    /// Sign out. Subscribers see `SignedOut` even if the server call fails.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the server reports an error.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.post_logout().await;
        self.publish(AuthState::SignedOut);
        result
    }

    async fn post_logout(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint("api/auth/logout")?)
            .send()
            .await?;

        check(response).await.map(drop)
    }

    /// Request a password recovery email. Returns whether the server accepted
    /// the request.
    ///
    /// # Errors
    ///
    /// Returns error only if the request could not be completed.
    pub async fn recover_password(&self, email: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .post(self.endpoint("api/auth/recover-password")?)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    /// The signed-in user, or `None` if the session has no user.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the server reports an error
    /// other than 401.
    pub async fn current_user(&self) -> Result<Option<User>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("api/auth/current-user")?)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.publish(AuthState::SignedOut);
            return Ok(None);
        }

        let user: User = check(response).await?.json().await?;
        self.publish(AuthState::SignedIn(user.clone()));
        Ok(Some(user))
    }

    /// Email of the signed-in user.
    ///
    /// # Errors
    ///
    /// See [`Self::current_user`].
    pub async fn user_email(&self) -> Result<Option<String>, ClientError> {
        Ok(self
            .current_user()
            .await?
            .map(|user| user.email.into_inner()))
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// List favorites, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` without a signed-in user.
    pub async fn list_favorites(&self) -> Result<Vec<FavoriteCity>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("api/favorites")?)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Add a favorite.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Conflict` if the city is already a favorite.
    pub async fn add_favorite(&self, city: &str) -> Result<FavoriteCity, ClientError> {
        let response = self.http.post(self.city_endpoint(city, "")?).send().await?;

        let body: FavoriteResponse = check(response).await?.json().await?;
        Ok(body.favorite)
    }

    /// Remove a favorite. Removing an absent city succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` without a signed-in user.
    pub async fn remove_favorite(&self, city: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.city_endpoint(city, "")?)
            .send()
            .await?;

        check(response).await.map(drop)
    }

    /// Whether `city` is a favorite.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::BadRequest` for an invalid city name.
    pub async fn is_favorite(&self, city: &str) -> Result<bool, ClientError> {
        let response = self.http.get(self.city_endpoint(city, "")?).send().await?;

        let body: IsFavoriteResponse = check(response).await?.json().await?;
        Ok(body.is_favorite)
    }

    /// Make `city` the home city, adding it to favorites if needed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::BadRequest` for an invalid city name.
    pub async fn set_home_city(&self, city: &str) -> Result<FavoriteCity, ClientError> {
        let response = self
            .http
            .post(self.city_endpoint(city, "/home")?)
            .send()
            .await?;

        let body: FavoriteResponse = check(response).await?.json().await?;
        Ok(body.favorite)
    }

    /// The home city, or `None` if none is set.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` without a signed-in user.
    pub async fn get_home_city(&self) -> Result<Option<FavoriteCity>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("api/favorites/home")?)
            .send()
            .await?;

        match check(response).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Clear the home city designation. The city stays a favorite.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` without a signed-in user.
    pub async fn remove_home_city(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint("api/favorites/home")?)
            .send()
            .await?;

        check(response).await.map(drop)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    /// Names the server would reject (including `.` and `..`, which URL
    /// resolution would swallow) fail here without a request.
    fn city_endpoint(&self, city: &str, suffix: &str) -> Result<Url, ClientError> {
        let city = CityName::parse(city).map_err(|e| ClientError::BadRequest(e.to_string()))?;
        self.endpoint(&format!(
            "api/favorites/{}{suffix}",
            urlencoding::encode(city.as_str())
        ))
    }

    fn publish(&self, state: AuthState) {
        self.auth_state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

/// Map a non-success response to a typed error.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);

    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::BadRequest(message),
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    })
}
