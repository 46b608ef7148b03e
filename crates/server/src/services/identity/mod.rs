//! Identity gateway.
//!
//! Wraps an external identity provider behind [`IdentityProvider`] and keeps
//! the signed-in user in the caller's session, never in shared state.

mod error;
mod gotrue;
mod memory;

pub use error::IdentityError;
pub use gotrue::GoTrueProvider;
pub use memory::MemoryIdentityProvider;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tower_sessions::Session;

use fairweather_core::{Email, User};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{AuthSession, session_keys};

/// An external service that issues and revokes user sessions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidCredentials` if the provider rejects them.
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, IdentityError>;

    /// Create an account. The result carries no tokens if the provider
    /// requires confirmation before issuing a session.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::RegistrationFailed` if the provider refuses it.
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, IdentityError>;

    /// Revoke the session identified by `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;

    /// Ask the provider to email a password recovery link.
    async fn send_password_recovery(&self, email: &Email) -> Result<(), IdentityError>;
}

/// Session-aware front for an [`IdentityProvider`].
#[derive(Clone)]
pub struct IdentityGateway {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityGateway {
    /// Create a gateway over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Sign in and bind the user to `session`, replacing any previous user.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidCredentials` on rejected credentials, or
    /// a provider/session error.
    pub async fn login(
        &self,
        session: &Session,
        email: &Email,
        password: &SecretString,
    ) -> Result<User, IdentityError> {
        let auth = self.provider.sign_in(email, password).await?;
        establish(session, &auth).await?;

        tracing::info!(user_id = %auth.user.id, "user signed in");
        Ok(auth.user)
    }

    /// Register and bind the new user to `session`.
    ///
    /// The session stays anonymous unless the provider issues tokens; an
    /// account awaiting email confirmation is not signed in.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::RegistrationFailed` if the provider refuses the
    /// registration or issues no session, or a provider/session error.
    pub async fn register(
        &self,
        session: &Session,
        email: &Email,
        password: &SecretString,
    ) -> Result<User, IdentityError> {
        let auth = self.provider.sign_up(email, password).await?;
        if auth.tokens.is_none() {
            tracing::info!(
                email_domain = email.domain(),
                "sign-up issued no session, confirmation pending"
            );
            return Err(IdentityError::RegistrationFailed(
                "no session issued".to_string(),
            ));
        }
        establish(session, &auth).await?;

        tracing::info!(user_id = %auth.user.id, "user registered");
        Ok(auth.user)
    }

    /// Sign out. The local session is always cleared; a provider failure is
    /// still reported to the caller.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, or a session error if clearing failed.
    pub async fn logout(&self, session: &Session) -> Result<(), IdentityError> {
        let current = current_session(session).await;

        let revoked = match current.as_ref().and_then(|auth| auth.tokens.as_ref()) {
            Some(tokens) if !tokens.is_expired_at(Utc::now()) => {
                self.provider.sign_out(&tokens.access_token).await
            }
            _ => Ok(()),
        };

        session.flush().await?;
        clear_sentry_user();

        if let Some(auth) = current {
            tracing::info!(user_id = %auth.user.id, "user signed out");
        }
        revoked
    }

    /// The user bound to `session`, if any. Makes no provider call.
    pub async fn current_user(&self, session: &Session) -> Option<User> {
        current_session(session).await.map(|auth| auth.user)
    }

    /// Ask the provider to send a password recovery email.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the request fails.
    pub async fn send_password_recovery(&self, email: &Email) -> Result<(), IdentityError> {
        self.provider.send_password_recovery(email).await?;
        tracing::info!(email_domain = email.domain(), "password recovery requested");
        Ok(())
    }
}

/// Read the authentication state stored in `session`.
///
/// A session that cannot be read is treated as signed out.
pub async fn current_session(session: &Session) -> Option<AuthSession> {
    match session.get::<AuthSession>(session_keys::AUTH_SESSION).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!("Failed to read session: {e}");
            None
        }
    }
}

/// Store `auth` in a fresh session ID.
async fn establish(session: &Session, auth: &AuthSession) -> Result<(), IdentityError> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH_SESSION, auth).await?;
    set_sentry_user(&auth.user.id, Some(auth.user.email.as_str()));
    Ok(())
}
