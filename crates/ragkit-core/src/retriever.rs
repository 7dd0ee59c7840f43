//! Retrieval capability.

use async_trait::async_trait;

use crate::document::ScoredDocument;
use crate::error::Result;

/// Answers a text query with scored documents.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns documents relevant to `query`, most relevant first.
    async fn retrieve(&self, query: &str) -> Result<Vec<ScoredDocument>>;
}
