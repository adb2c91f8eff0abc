use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};

use crate::error::{QueryError, Result};

pub const MAX_KEY_LEN: usize = 255;

/// Checks that a property key is safe to address a field inside a stored
/// property bag: non-empty, at most 255 bytes, only `[A-Za-z0-9_]`.
pub fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "property key cannot be empty"
    } else if key.len() > MAX_KEY_LEN {
        "property key too long (max 255 characters)"
    } else if !key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        "property key must contain only alphanumeric characters and underscores"
    } else {
        return Ok(());
    };

    Err(QueryError::InvalidKey {
        key: key.to_owned(),
        reason,
    })
}

/// A property key that passed [`validate_key`].
///
/// Predicates are only ever built from this type, so an unvalidated key
/// cannot reach the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyKey(String);

impl PropertyKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PropertyKey {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PropertyKey {
    type Error = QueryError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PropertyKey> for String {
    fn from(value: PropertyKey) -> Self {
        value.0
    }
}

impl Deref for PropertyKey {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_and_underscore() {
        for key in ["product", "Product_2", "_", "a", "ORDER_total_99"] {
            assert!(validate_key(key).is_ok(), "{key}");
        }

        assert!(validate_key(&"k".repeat(MAX_KEY_LEN)).is_ok());
    }

    #[test]
    fn rejects_empty_and_too_long() {
        assert!(matches!(
            validate_key(""),
            Err(QueryError::InvalidKey { .. })
        ));
        assert!(validate_key(&"k".repeat(MAX_KEY_LEN + 1)).is_err());
    }

    #[test]
    fn rejects_anything_outside_the_whitelist() {
        for key in [
            "product-name",
            "a.b",
            "price'",
            "x' OR '1'='1",
            "$.product",
            "white space",
            "ümlaut",
            "semi;colon",
        ] {
            assert!(validate_key(key).is_err(), "{key}");
        }
    }

    #[test]
    fn property_key_only_constructs_from_valid_input() {
        assert_eq!(PropertyKey::new("amount").unwrap().as_str(), "amount");
        assert!(PropertyKey::try_from("amo unt").is_err());
        assert!(serde_json::from_str::<PropertyKey>("\"bad-key\"").is_err());
        assert_eq!(
            serde_json::from_str::<PropertyKey>("\"good_key\"").unwrap(),
            PropertyKey::new("good_key").unwrap()
        );
    }
}
