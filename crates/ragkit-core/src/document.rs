//! Retrieved document types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document metadata: a JSON object.
pub type Metadata = Map<String, Value>;

/// A document returned by a retriever.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Backend identifier, coerced to a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Text content of the document.
    pub page_content: String,
    /// Associated metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Creates a new document with the given content and no metadata.
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            id: None,
            page_content: page_content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Sets the document identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replaces the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Adds a single metadata field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A document paired with its relevance score.
///
/// The score is absent, not zero, when the backend could not produce one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// The retrieved document.
    pub document: Document,
    /// Relevance score or distance, as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl ScoredDocument {
    /// Creates a scored document.
    pub fn new(document: Document, score: Option<f32>) -> Self {
        Self { document, score }
    }

    /// Splits into the document and its score.
    pub fn into_parts(self) -> (Document, Option<f32>) {
        (self.document, self.score)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_builder() {
        let doc = Document::new("hello")
            .with_id("42")
            .with_field("source", json!("notes.md"));
        assert_eq!(doc.id.as_deref(), Some("42"));
        assert_eq!(doc.metadata["source"], json!("notes.md"));
    }

    #[test]
    fn test_absent_score_is_not_serialized() {
        let scored = ScoredDocument::new(Document::new("x"), None);
        let value = serde_json::to_value(&scored).unwrap();
        assert!(value.get("score").is_none());
    }
}
