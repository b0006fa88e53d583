//! Typed attribute values attached to entities.

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
///
/// The tracker only yields text, flags and coordinates, so those are the
/// only shapes an attribute can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// The empty-string sentinel used for "no data" attributes.
    #[must_use]
    pub fn empty() -> Self {
        Self::String(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_string_variant_as_plain_string() {
        let json = serde_json::to_string(&AttributeValue::from("Solna")).unwrap();
        assert_eq!(json, "\"Solna\"");
    }

    #[test]
    fn should_serialize_float_variant_as_number() {
        let json = serde_json::to_string(&AttributeValue::Float(59.33)).unwrap();
        assert_eq!(json, "59.33");
    }

    #[test]
    fn should_serialize_bool_variant() {
        let json = serde_json::to_string(&AttributeValue::Bool(true)).unwrap();
        assert_eq!(json, "true");
    }

    #[test]
    fn should_deserialize_empty_string_as_string_variant() {
        let val: AttributeValue = serde_json::from_str("\"\"").unwrap();
        assert_eq!(val, AttributeValue::empty());
    }

    #[test]
    fn should_expose_text_only_for_strings() {
        assert_eq!(AttributeValue::from("7").as_str(), Some("7"));
        assert_eq!(AttributeValue::Bool(false).as_str(), None);
    }
}
