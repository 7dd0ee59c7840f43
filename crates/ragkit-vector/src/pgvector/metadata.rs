//! Metadata normalization.

use serde_json::{Map, Value};

use crate::TRACING_TARGET;
use crate::error::{VectorError, VectorResult};

/// Metadata as read from the `cmetadata` column, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawMetadata {
    /// Already a mapping (JSONB object).
    Mapping(Map<String, Value>),
    /// Raw UTF-8 bytes of a JSON document.
    Bytes(Vec<u8>),
    /// A JSON document stored as a string.
    Text(String),
    /// Any other shape, including SQL `NULL`.
    Other(Value),
}

impl From<Option<Value>> for RawMetadata {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self::Mapping(map),
            Some(Value::String(text)) => Self::Text(text),
            Some(other) => Self::Other(other),
            None => Self::Other(Value::Null),
        }
    }
}

impl From<Option<Vec<u8>>> for RawMetadata {
    fn from(value: Option<Vec<u8>>) -> Self {
        value.map_or(Self::Other(Value::Null), Self::Bytes)
    }
}

/// Turns raw metadata into a mapping.
///
/// Bytes are decoded as UTF-8 and then parsed as JSON, text is parsed as
/// JSON, mappings pass through and anything else becomes an empty mapping.
/// JSON that parses to a non-object value also becomes an empty mapping.
///
/// # Errors
///
/// Returns [`VectorError::MetadataDecode`] for invalid UTF-8 or invalid JSON.
pub fn normalize_metadata(raw: RawMetadata) -> VectorResult<Map<String, Value>> {
    match raw {
        RawMetadata::Mapping(map) => Ok(map),
        RawMetadata::Bytes(bytes) => {
            let text = String::from_utf8(bytes)
                .map_err(|e| VectorError::metadata_decode(format!("invalid utf-8: {}", e)))?;
            parse_json_object(&text)
        }
        RawMetadata::Text(text) => parse_json_object(&text),
        RawMetadata::Other(_) => Ok(Map::new()),
    }
}

fn parse_json_object(text: &str) -> VectorResult<Map<String, Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| VectorError::metadata_decode(format!("invalid json: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => {
            tracing::warn!(
                target: TRACING_TARGET,
                kind = %json_kind(&other),
                "Metadata is not a JSON object, using empty mapping"
            );
            Ok(Map::new())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn expected() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("a".into(), json!(1));
        map
    }

    #[test]
    fn test_bytes_are_decoded_and_parsed() {
        let raw = RawMetadata::Bytes(br#"{"a":1}"#.to_vec());
        assert_eq!(normalize_metadata(raw).unwrap(), expected());
    }

    #[test]
    fn test_text_is_parsed() {
        let raw = RawMetadata::Text(r#"{"a":1}"#.into());
        assert_eq!(normalize_metadata(raw).unwrap(), expected());
    }

    #[test]
    fn test_mapping_passes_through() {
        let raw = RawMetadata::Mapping(expected());
        assert_eq!(normalize_metadata(raw).unwrap(), expected());
    }

    #[test]
    fn test_other_shapes_become_empty() {
        assert!(normalize_metadata(RawMetadata::Other(json!(42))).unwrap().is_empty());
        assert!(normalize_metadata(RawMetadata::Other(Value::Null)).unwrap().is_empty());
        assert!(normalize_metadata(RawMetadata::Text("[1,2]".into())).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let err = normalize_metadata(RawMetadata::Bytes(vec![0xff, 0xfe])).unwrap_err();
        assert!(matches!(err, VectorError::MetadataDecode(_)));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = normalize_metadata(RawMetadata::Text("{not json".into())).unwrap_err();
        assert!(matches!(err, VectorError::MetadataDecode(_)));
    }

    #[test]
    fn test_column_values_map_to_variants() {
        assert_eq!(
            RawMetadata::from(Some(json!({"a": 1}))),
            RawMetadata::Mapping(expected())
        );
        assert_eq!(
            RawMetadata::from(Some(json!("{}"))),
            RawMetadata::Text("{}".into())
        );
        assert_eq!(
            RawMetadata::from(None::<Vec<u8>>),
            RawMetadata::Other(Value::Null)
        );
    }
}
