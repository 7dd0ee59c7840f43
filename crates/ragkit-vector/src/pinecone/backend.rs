//! Pinecone backend implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use pinecone_sdk::models::{Kind, Metadata, Namespace, Value as PineconeValue};
use pinecone_sdk::pinecone::PineconeClientConfig;
use pinecone_sdk::pinecone::data::Index;
use ragkit_core::{Document, ScoredDocument, SearchKwargs};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::PineconeConfig;
use crate::TRACING_TARGET;
use crate::error::{VectorError, VectorResult};
use crate::store::VectorStoreBackend;

/// Pinecone backend attached to an existing index.
pub struct PineconeBackend {
    index: Mutex<Index>,
    config: PineconeConfig,
}

impl PineconeBackend {
    /// Connects to an existing index.
    pub async fn connect(config: &PineconeConfig) -> VectorResult<Self> {
        let client_config = PineconeClientConfig {
            api_key: Some(config.api_key.clone()),
            ..Default::default()
        };

        let client = client_config
            .client()
            .map_err(|e| VectorError::connection(e.to_string()))?;

        // Describe the index to get its host
        let index_description = client.describe_index(&config.index).await.map_err(|e| {
            VectorError::collection_not_found(format!("{}: {}", config.index, e))
        })?;

        let index = client
            .index(&index_description.host)
            .await
            .map_err(|e| VectorError::connection(format!("Failed to connect to index: {}", e)))?;

        tracing::debug!(
            target: TRACING_TARGET,
            index = %config.index,
            host = %index_description.host,
            "Pinecone backend connected"
        );

        Ok(Self {
            index: Mutex::new(index),
            config: config.clone(),
        })
    }

    fn namespace(&self, kwargs: &SearchKwargs) -> Namespace {
        kwargs
            .namespace()
            .or(self.config.namespace.as_deref())
            .map(Namespace::from)
            .unwrap_or_default()
    }
}

#[async_trait]
impl VectorStoreBackend for PineconeBackend {
    async fn similarity_search(
        &self,
        query: Vec<f32>,
        kwargs: &SearchKwargs,
    ) -> VectorResult<Vec<ScoredDocument>> {
        let namespace = self.namespace(kwargs);
        let filter = kwargs.filter().cloned().map(json_to_metadata);

        let mut index = self.index.lock().await;
        let response = index
            .query_by_value(
                query,
                None, // sparse values
                kwargs.k() as u32,
                &namespace,
                filter,
                Some(false),
                Some(true),
            )
            .await
            .map_err(|e| VectorError::backend(e.to_string()))?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| {
                let metadata = m.metadata.map(metadata_to_json).unwrap_or_default();
                let document = split_text_key(m.id, metadata, &self.config.text_key);
                ScoredDocument::new(document, Some(m.score))
            })
            .collect())
    }

    async fn close(&self) -> VectorResult<()> {
        // The gRPC channel is dropped with the index handle.
        Ok(())
    }
}

impl std::fmt::Debug for PineconeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeBackend")
            .field("index", &self.config.index)
            .finish()
    }
}

/// Moves the text field out of the metadata and into the page content.
fn split_text_key(id: String, mut metadata: Map<String, Value>, text_key: &str) -> Document {
    let page_content = match metadata.remove(text_key) {
        Some(Value::String(text)) => text,
        Some(other) => {
            tracing::warn!(
                target: TRACING_TARGET,
                text_key = %text_key,
                "Text field is not a string"
            );
            metadata.insert(text_key.to_string(), other);
            String::new()
        }
        None => String::new(),
    };

    Document {
        id: Some(id),
        page_content,
        metadata,
    }
}

fn metadata_to_json(metadata: Metadata) -> Map<String, Value> {
    metadata
        .fields
        .into_iter()
        .map(|(k, v)| (k, pinecone_value_to_json(v)))
        .collect()
}

fn json_to_metadata(map: Map<String, Value>) -> Metadata {
    let fields: BTreeMap<String, PineconeValue> = map
        .into_iter()
        .map(|(k, v)| (k, json_to_pinecone_value(v)))
        .collect();

    Metadata { fields }
}

/// Convert Pinecone Value to serde_json::Value
fn pinecone_value_to_json(value: PineconeValue) -> Value {
    match value.kind {
        Some(Kind::NullValue(_)) | None => Value::Null,
        Some(Kind::NumberValue(n)) => serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, pinecone_value_to_json(v)))
                .collect(),
        ),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(pinecone_value_to_json).collect())
        }
    }
}

/// Convert serde_json::Value to Pinecone Value
fn json_to_pinecone_value(value: Value) -> PineconeValue {
    let kind = match value {
        Value::Null => Some(Kind::NullValue(0)),
        Value::Bool(b) => Some(Kind::BoolValue(b)),
        Value::Number(n) => Some(Kind::NumberValue(n.as_f64().unwrap_or(0.0))),
        Value::String(s) => Some(Kind::StringValue(s)),
        Value::Array(arr) => Some(Kind::ListValue(prost_types::ListValue {
            values: arr.into_iter().map(json_to_pinecone_value).collect(),
        })),
        Value::Object(obj) => Some(Kind::StructValue(prost_types::Struct {
            fields: obj
                .into_iter()
                .map(|(k, v)| (k, json_to_pinecone_value(v)))
                .collect(),
        })),
    };

    PineconeValue { kind }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_filter_converts_to_metadata() {
        let Value::Object(filter) = json!({"user_id": {"$eq": "u-1"}, "score": 0.5}) else {
            unreachable!()
        };
        let metadata = json_to_metadata(filter.clone());
        assert_eq!(metadata.fields.len(), 2);
        assert_eq!(metadata_to_json(metadata), filter);
    }

    #[test]
    fn test_text_key_becomes_page_content() {
        let Value::Object(metadata) = json!({"text": "hello", "source": "a.md"}) else {
            unreachable!()
        };
        let doc = split_text_key("id-1".into(), metadata, "text");
        assert_eq!(doc.page_content, "hello");
        assert_eq!(doc.id.as_deref(), Some("id-1"));
        assert_eq!(doc.metadata.len(), 1);
        assert_eq!(doc.metadata["source"], json!("a.md"));
    }

    #[test]
    fn test_missing_text_key_gives_empty_content() {
        let doc = split_text_key("id-2".into(), Map::new(), "text");
        assert!(doc.page_content.is_empty());
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn test_nan_number_becomes_null() {
        let value = PineconeValue {
            kind: Some(Kind::NumberValue(f64::NAN)),
        };
        assert_eq!(pinecone_value_to_json(value), Value::Null);
    }
}
