//! Payload mapping for Qdrant points
//!
//! A record's metadata is stored as top-level payload fields next to two
//! reserved fields holding the caller's identifier and the record text.

use super::{Record, StoredRecord};
use crate::metadata::{Metadata, MetadataValue};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::Value as QdrantValue;
use serde_json::Value;
use std::collections::HashMap;

/// Payload field holding the caller-supplied record identifier
pub const RECORD_ID_KEY: &str = "_record_id";

/// Payload field holding the record text
pub const TEXT_KEY: &str = "_text";

/// Build the Qdrant payload for a record
pub fn record_payload(record: &Record) -> HashMap<String, QdrantValue> {
    let mut map: HashMap<String, QdrantValue> = record
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), metadata_to_qdrant(v)))
        .collect();

    map.insert(RECORD_ID_KEY.to_string(), string_to_qdrant(&record.id));
    map.insert(TEXT_KEY.to_string(), string_to_qdrant(&record.text));
    map
}

pub fn metadata_to_qdrant(value: &MetadataValue) -> QdrantValue {
    let kind = match value {
        MetadataValue::Null => Kind::NullValue(0),
        MetadataValue::Bool(b) => Kind::BoolValue(*b),
        MetadataValue::Int(i) => Kind::IntegerValue(*i),
        // Qdrant integers are signed 64-bit
        MetadataValue::UInt(u) => Kind::StringValue(u.to_string()),
        MetadataValue::Float(f) => Kind::DoubleValue(*f),
        MetadataValue::String(s) => Kind::StringValue(s.clone()),
    };
    QdrantValue { kind: Some(kind) }
}

fn string_to_qdrant(s: &str) -> QdrantValue {
    QdrantValue {
        kind: Some(Kind::StringValue(s.to_string())),
    }
}

/// Split a point payload back into a stored record
///
/// `fallback_id` is used when the payload carries no record identifier.
pub fn split_payload(payload: HashMap<String, QdrantValue>, fallback_id: String) -> StoredRecord {
    let mut id = fallback_id;
    let mut text = String::new();
    let mut metadata = Metadata::new();

    for (key, value) in payload {
        let json = json_from_qdrant_value(value);
        match key.as_str() {
            RECORD_ID_KEY => {
                if let Value::String(s) = json {
                    id = s;
                }
            }
            TEXT_KEY => {
                if let Value::String(s) = json {
                    text = s;
                }
            }
            _ => {
                metadata.insert(key, MetadataValue::from_json(&json));
            }
        }
    }

    StoredRecord { id, text, metadata }
}

/// Convert Qdrant value to serde_json Value
pub fn json_from_qdrant_value(v: QdrantValue) -> Value {
    match v.kind {
        Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(json_from_qdrant_value)
                .collect(),
        ),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect(),
        ),
        None => Value::Null,
    }
}
