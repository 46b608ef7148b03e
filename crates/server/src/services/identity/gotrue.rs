//! GoTrue identity provider client.
//!
//! Talks to a GoTrue-compatible auth REST API (the API behind Supabase Auth).
//! Every request carries the project's `apikey` header; user-scoped calls add
//! the user's bearer token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use fairweather_core::{Email, User, UserId};

use super::{IdentityError, IdentityProvider};
use crate::config::IdentityConfig;
use crate::models::{AuthSession, SessionTokens};

/// GoTrue REST client.
#[derive(Clone)]
pub struct GoTrueProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl GoTrueProvider {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        Self::new(config.url.clone(), &config.api_key, config.timeout)
    }

    /// Create a client for the provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(
        mut base_url: Url,
        api_key: &SecretString,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();

        let mut key = HeaderValue::from_str(api_key.expose_secret()).map_err(|e| {
            IdentityError::UnexpectedResponse(format!("Invalid API key format: {e}"))
        })?;
        key.set_sensitive(true);
        headers.insert("apikey", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        // Url::join drops the last path segment unless it ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.base_url
            .join(path)
            .map_err(|e| IdentityError::UnexpectedResponse(format!("invalid endpoint {path}: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, IdentityError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            let message = error_message(response).await;
            tracing::debug!(%status, %message, "provider rejected sign-in");
            return Err(IdentityError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(provider_error(response).await);
        }

        let session: GoTrueSession = response
            .json()
            .await
            .map_err(|e| IdentityError::UnexpectedResponse(e.to_string()))?;
        session.into_auth_session()
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, IdentityError> {
        let url = self.endpoint("auth/v1/signup")?;

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST
                | StatusCode::UNPROCESSABLE_ENTITY
                | StatusCode::TOO_MANY_REQUESTS
        ) {
            return Err(IdentityError::RegistrationFailed(
                error_message(response).await,
            ));
        }
        if !status.is_success() {
            return Err(provider_error(response).await);
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::UnexpectedResponse(e.to_string()))?;

        match body {
            SignUpResponse::Session(session) => session.into_auth_session(),
            SignUpResponse::User(user) => Ok(AuthSession::without_tokens(user.into_user()?)),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let url = self.endpoint("auth/v1/logout")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        // The token is already unusable; nothing left to revoke.
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            return Ok(());
        }
        if !status.is_success() {
            return Err(provider_error(response).await);
        }

        Ok(())
    }

    async fn send_password_recovery(&self, email: &Email) -> Result<(), IdentityError> {
        let url = self.endpoint("auth/v1/recover")?;

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "email": email.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        Ok(())
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Map<String, Value>,
}

impl GoTrueUser {
    fn into_user(self) -> Result<User, IdentityError> {
        let raw_email = self
            .email
            .ok_or_else(|| IdentityError::UnexpectedResponse("user has no email".to_string()))?;
        let email = Email::parse(&raw_email)
            .map_err(|e| IdentityError::UnexpectedResponse(format!("invalid user email: {e}")))?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            user_metadata: self.user_metadata,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: GoTrueUser,
}

impl GoTrueSession {
    fn into_auth_session(self) -> Result<AuthSession, IdentityError> {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });

        Ok(AuthSession {
            user: self.user.into_user()?,
            tokens: Some(SessionTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
                expires_at,
            }),
        })
    }
}

/// Sign-up answers with a session when auto-confirm is on, a bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(GoTrueSession),
    User(GoTrueUser),
}

/// GoTrue error bodies vary by endpoint and version.
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Best-effort human-readable message from an error response.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    serde_json::from_str::<GoTrueErrorBody>(&text)
        .ok()
        .and_then(GoTrueErrorBody::into_message)
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| status.to_string())
}

async fn provider_error(response: reqwest::Response) -> IdentityError {
    let status = response.status().as_u16();
    let message = error_message(response).await;
    IdentityError::Provider { status, message }
}
