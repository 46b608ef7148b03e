//! City name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CityName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CityNameError {
    /// The input is empty or whitespace only.
    #[error("City name cannot be empty.")]
    Empty,
    /// The input is too long.
    #[error("City name must be at most {max} characters.")]
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
    /// The input contains control characters.
    #[error("City name cannot contain control characters.")]
    ControlCharacter,
    /// The input is `.` or `..`, which cannot be addressed as a path segment.
    #[error("City name cannot be \".\" or \"..\".")]
    DotSegment,
}

/// A favorite city's name.
///
/// Names are trimmed and otherwise kept verbatim. Equality is exact, so
/// "Paris" and "paris" are distinct favorites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CityName(String);

impl CityName {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a city name.
    ///
    /// # Errors
    ///
    /// Returns a [`CityNameError`] if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`] characters, contains control characters, or is a
    /// URL dot segment.
    pub fn parse(s: &str) -> Result<Self, CityNameError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(CityNameError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(CityNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(CityNameError::ControlCharacter);
        }
        if matches!(trimmed, "." | "..") {
            return Err(CityNameError::DotSegment);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CityName {
    type Err = CityNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CityName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CityName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CityName {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Rows were validated on insert
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CityName {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let city = CityName::parse("  New York ").unwrap();
        assert_eq!(city.as_str(), "New York");
    }

    #[test]
    fn test_parse_is_case_preserving() {
        assert_ne!(
            CityName::parse("Paris").unwrap(),
            CityName::parse("paris").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(CityName::parse(""), Err(CityNameError::Empty));
        assert_eq!(CityName::parse(" \t "), Err(CityNameError::Empty));
    }

    #[test]
    fn test_parse_length_counts_chars() {
        // 100 multi-byte characters is still within the limit
        assert!(CityName::parse(&"é".repeat(100)).is_ok());
        assert!(matches!(
            CityName::parse(&"a".repeat(101)),
            Err(CityNameError::TooLong { max: 100 })
        ));
    }

    #[test]
    fn test_parse_rejects_control_characters() {
        assert_eq!(
            CityName::parse("Par\u{0}is"),
            Err(CityNameError::ControlCharacter)
        );
    }

    #[test]
    fn test_parse_rejects_dot_segments() {
        assert_eq!(CityName::parse("."), Err(CityNameError::DotSegment));
        assert_eq!(CityName::parse(" .. "), Err(CityNameError::DotSegment));
        assert!(CityName::parse("...").is_ok());
        assert!(CityName::parse("St. Louis").is_ok());
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        assert_eq!(CityNameError::Empty.to_string(), "City name cannot be empty.");
    }
}
