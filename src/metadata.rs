//! Record metadata
//!
//! Vector stores only accept flat, primitive metadata values. Nested
//! structures are flattened to their JSON text before storage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A primitive metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

/// Metadata attached to a stored record
pub type Metadata = BTreeMap<String, MetadataValue>;

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl MetadataValue {
    /// Convert a JSON value, serializing arrays and objects to JSON text
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => MetadataValue::Null,
            Value::Bool(b) => MetadataValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MetadataValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    MetadataValue::UInt(u)
                } else {
                    MetadataValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => MetadataValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => MetadataValue::String(value.to_string()),
        }
    }

    /// Convert back to a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            MetadataValue::Null => Value::Null,
            MetadataValue::Bool(b) => Value::Bool(*b),
            MetadataValue::Int(i) => Value::from(*i),
            MetadataValue::UInt(u) => Value::from(*u),
            MetadataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            MetadataValue::String(s) => Value::String(s.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Normalize an arbitrary JSON object into store-safe metadata
pub fn normalize_metadata(map: &Map<String, Value>) -> Metadata {
    map.iter()
        .map(|(k, v)| (k.clone(), MetadataValue::from_json(v)))
        .collect()
}

/// Metadata for a proposal chunk
pub fn source_metadata(filename: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(SOURCE_KEY.to_string(), MetadataValue::from(filename));
    metadata
}

/// Metadata key naming the PDF a chunk came from
pub const SOURCE_KEY: &str = "source";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives_pass_through() {
        let input = json!({
            "name": "Acme",
            "employees": 42,
            "revenue": 1.5,
            "nonprofit": false,
            "parent": null,
        });
        let normalized = normalize_metadata(input.as_object().unwrap());

        assert_eq!(normalized["name"], MetadataValue::String("Acme".into()));
        assert_eq!(normalized["employees"], MetadataValue::Int(42));
        assert_eq!(normalized["revenue"], MetadataValue::Float(1.5));
        assert_eq!(normalized["nonprofit"], MetadataValue::Bool(false));
        assert_eq!(normalized["parent"], MetadataValue::Null);
    }

    #[test]
    fn test_large_unsigned_integer_keeps_precision() {
        let input = json!({"id": u64::MAX, "small": 7u64});
        let normalized = normalize_metadata(input.as_object().unwrap());

        assert_eq!(normalized["id"], MetadataValue::UInt(u64::MAX));
        assert_eq!(normalized["small"], MetadataValue::Int(7));
        assert_eq!(normalized["id"].to_json(), json!(u64::MAX));

        let text = serde_json::to_string(&normalized).unwrap();
        let parsed: Metadata = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, normalized);
    }

    #[test]
    fn test_nested_values_become_json_text() {
        let input = json!({
            "sectors": ["energy", "water"],
            "address": {"city": "Oslo", "zip": 150},
        });
        let normalized = normalize_metadata(input.as_object().unwrap());

        let sectors = normalized["sectors"].as_str().unwrap();
        assert_eq!(sectors, serde_json::to_string(&input["sectors"]).unwrap());
        let reparsed: Value = serde_json::from_str(sectors).unwrap();
        assert_eq!(reparsed, input["sectors"]);

        let address = normalized["address"].as_str().unwrap();
        let reparsed: Value = serde_json::from_str(address).unwrap();
        assert_eq!(reparsed, input["address"]);
    }

    #[test]
    fn test_metadata_serializes_flat() {
        let metadata = source_metadata("call-2024.pdf");
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json, json!({"source": "call-2024.pdf"}));

        let back: Metadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, metadata);
    }
}
