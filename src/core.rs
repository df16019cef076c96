//! # Core

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object.
///
/// Used for `@context` entries (a URL or an inline context map) and for
/// verification relationship entries (a method ID or an embedded method).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

impl<T> Kind<T> {
    /// Returns `true` if the `Kind` is a string.
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns `true` if the `Kind` is an object.
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// The string value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Object(_) => None,
        }
    }
}

impl<T> From<String> for Kind<T> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T> From<&str> for Kind<T> {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn string_or_object() {
        let kinds: Vec<Kind<Value>> = serde_json::from_value(json!([
            "https://www.w3.org/ns/did/v1",
            { "@base": "https://example.com/keys/" }
        ]))
        .expect("should deserialize");

        assert!(kinds[0].is_string());
        assert_eq!(kinds[0].as_str(), Some("https://www.w3.org/ns/did/v1"));
        assert!(kinds[1].is_object());
        assert_eq!(kinds[1].as_str(), None);
    }
}
