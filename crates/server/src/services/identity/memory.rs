//! In-process identity provider.
//!
//! Accounts and issued tokens live in memory; passwords are hashed with
//! Argon2id. Used for local development without an identity service and by
//! tests.

use std::collections::{HashMap, HashSet};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use fairweather_core::{Email, User, UserId};

use super::{IdentityError, IdentityProvider};
use crate::models::{AuthSession, SessionTokens};

/// Lifetime of issued access tokens.
const TOKEN_TTL_SECONDS: i64 = 60 * 60;

struct Account {
    user: User,
    password_hash: String,
}

/// Identity provider backed by process memory.
pub struct MemoryIdentityProvider {
    hasher: Argon2<'static>,
    accounts: RwLock<HashMap<Email, Account>>,
    tokens: RwLock<HashSet<String>>,
    recoveries: Mutex<Vec<Email>>,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::with_hasher(Argon2::default())
    }
}

impl MemoryIdentityProvider {
    /// Create a provider with the default Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that hashes with the smallest Argon2id parameters.
    ///
    /// Only suitable for tests and throwaway local data.
    #[must_use]
    pub fn with_minimal_hashing_cost() -> Self {
        let params = Params::new(
            Params::MIN_M_COST,
            Params::MIN_T_COST,
            Params::MIN_P_COST,
            None,
        )
        .unwrap_or_default();
        Self::with_hasher(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn with_hasher(hasher: Argon2<'static>) -> Self {
        Self {
            hasher,
            accounts: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashSet::new()),
            recoveries: Mutex::new(Vec::new()),
        }
    }

    /// Number of access tokens issued and not yet revoked.
    pub async fn active_token_count(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Emails for which password recovery was requested, oldest first.
    pub async fn recovery_requests(&self) -> Vec<Email> {
        self.recoveries.lock().await.clone()
    }

    async fn issue_session(&self, user: User) -> AuthSession {
        let access_token = Uuid::new_v4().to_string();
        self.tokens.write().await.insert(access_token.clone());

        AuthSession {
            user,
            tokens: Some(SessionTokens {
                access_token,
                refresh_token: Some(Uuid::new_v4().to_string()),
                expires_at: Some(Utc::now() + Duration::seconds(TOKEN_TTL_SECONDS)),
            }),
        }
    }

    /// Hash a password using Argon2id.
    fn hash_password(&self, password: &SecretString) -> Result<String, IdentityError> {
        let salt = SaltString::generate(&mut OsRng);

        self.hasher
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| IdentityError::PasswordHash)
    }

    /// Verify a password against a hash.
    fn verify_password(&self, password: &SecretString, hash: &str) -> Result<(), IdentityError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| IdentityError::PasswordHash)?;

        self.hasher
            .verify_password(password.expose_secret().as_bytes(), &parsed_hash)
            .map_err(|_| IdentityError::InvalidCredentials)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, IdentityError> {
        let user = {
            let accounts = self.accounts.read().await;
            let account = accounts
                .get(email)
                .ok_or(IdentityError::InvalidCredentials)?;
            self.verify_password(password, &account.password_hash)?;
            account.user.clone()
        };

        Ok(self.issue_session(user).await)
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, IdentityError> {
        if password.expose_secret().trim().is_empty() {
            return Err(IdentityError::RegistrationFailed(
                "password cannot be empty".to_string(),
            ));
        }

        let password_hash = self.hash_password(password)?;

        let user = {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(email) {
                return Err(IdentityError::RegistrationFailed(
                    "user already registered".to_string(),
                ));
            }

            let user = User::new(UserId::new(Uuid::new_v4().to_string()), email.clone());
            accounts.insert(
                email.clone(),
                Account {
                    user: user.clone(),
                    password_hash,
                },
            );
            user
        };

        Ok(self.issue_session(user).await)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        // Unknown tokens are already signed out.
        self.tokens.write().await.remove(access_token);
        Ok(())
    }

    async fn send_password_recovery(&self, email: &Email) -> Result<(), IdentityError> {
        // Unknown addresses succeed too, so callers cannot probe for accounts.
        self.recoveries.lock().await.push(email.clone());
        Ok(())
    }
}
