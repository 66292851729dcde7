//! Property values
//!
//! Component configuration is a dynamically-typed bag at the model boundary.
//! Interpretation of the values (including any dynamic expressions embedded
//! in strings) belongs to the property-editing and rendering collaborators.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Ordered property map (insertion order is preserved through load/save)
pub type Properties = IndexMap<String, PropertyValue>;

/// Presentation attributes, cloned independently of properties
pub type Style = IndexMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<PropertyValue>),
    Map(IndexMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value.into())
    }
}

impl From<f64> for PropertyValue {
    /// Non-finite floats have no JSON representation and become `0`.
    fn from(value: f64) -> Self {
        PropertyValue::Number(Number::from_f64(value).unwrap_or_else(|| 0.into()))
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(value: Vec<PropertyValue>) -> Self {
        PropertyValue::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_stay_integers() {
        let value: PropertyValue = serde_json::from_str("12").unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), "12");

        let value: PropertyValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(value.as_f64(), Some(1.5));
    }

    #[test]
    fn test_nested_map_keeps_order() {
        let json = r#"{"z":1,"a":{"y":true,"b":"x"},"m":[1,"two",false]}"#;
        let value: PropertyValue = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), json);
    }

    #[test]
    fn test_null_is_rejected() {
        assert!(serde_json::from_str::<PropertyValue>("null").is_err());
    }
}
