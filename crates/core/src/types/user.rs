//! User record as reported by the identity provider.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Email, UserId};

/// A user known to the identity provider.
///
/// This system never creates or mutates users itself; it only relays what the
/// provider returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Provider-issued identifier.
    pub id: UserId,
    /// Primary email address.
    pub email: Email,
    /// Free-form metadata attached by the provider or at sign-up.
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl User {
    /// A user with no metadata.
    #[must_use]
    pub fn new(id: UserId, email: Email) -> Self {
        Self {
            id,
            email,
            user_metadata: Map::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let user = User::new(UserId::new("u1"), Email::parse("a@x.com").unwrap());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "u1", "email": "a@x.com", "userMetadata": {} })
        );
    }

    #[test]
    fn test_metadata_defaults_when_missing() {
        let user: User = serde_json::from_str(r#"{"id":"u1","email":"a@x.com"}"#).unwrap();
        assert!(user.user_metadata.is_empty());
    }
}
