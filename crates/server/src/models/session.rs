//! Session-related types.
//!
//! Types stored in the server-side session for authentication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fairweather_core::User;

/// Session-stored authentication state.
///
/// Replaces a process-wide "current user": each browser session carries its
/// own user and provider tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// The signed-in user.
    pub user: User,
    /// Provider tokens. `None` for a sign-up awaiting email confirmation,
    /// which the gateway refuses to store in a session.
    pub tokens: Option<SessionTokens>,
}

impl AuthSession {
    /// A session without provider tokens.
    #[must_use]
    pub const fn without_tokens(user: User) -> Self {
        Self { user, tokens: None }
    }
}

/// Tokens issued by the identity provider.
///
/// Implements `Debug` manually to redact token values. Tokens only ever live
/// in the server-side session store.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Bearer token for provider calls on behalf of the user.
    pub access_token: String,
    /// Token used to obtain a new access token.
    pub refresh_token: Option<String>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionTokens {
    /// Whether the access token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the signed-in user's [`super::AuthSession`].
    pub const AUTH_SESSION: &str = "auth_session";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use fairweather_core::{Email, UserId};

    use super::*;

    fn tokens(expires_at: Option<DateTime<Utc>>) -> SessionTokens {
        SessionTokens {
            access_token: "access-secret".to_string(),
            refresh_token: Some("refresh-secret".to_string()),
            expires_at,
        }
    }

    #[test]
    fn test_tokens_debug_redacts_values() {
        let debug_output = format!("{:?}", tokens(None));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("access-secret"));
        assert!(!debug_output.contains("refresh-secret"));
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        assert!(tokens(Some(now - Duration::seconds(1))).is_expired_at(now));
        assert!(!tokens(Some(now + Duration::seconds(60))).is_expired_at(now));
        assert!(!tokens(None).is_expired_at(now));
    }

    #[test]
    fn test_session_roundtrips_through_json() {
        let user = User::new(UserId::new("u1"), Email::parse("a@x.com").unwrap());
        let session = AuthSession {
            user: user.clone(),
            tokens: Some(tokens(None)),
        };

        let value = serde_json::to_value(&session).unwrap();
        let restored: AuthSession = serde_json::from_value(value).unwrap();
        assert_eq!(restored.user, user);
        assert_eq!(restored.tokens.unwrap().access_token, "access-secret");
    }
}
