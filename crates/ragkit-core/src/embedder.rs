//! Text embedding capability.

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into dense vectors.
///
/// Implementations are cheap to clone and safe to share across tasks.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Returns the model name, without the provider prefix.
    fn model_name(&self) -> &str;

    /// Returns the provider name.
    fn provider_name(&self) -> &str;

    /// Returns the embedding dimensionality, or 0 when it is not known upfront.
    fn ndims(&self) -> usize;

    /// Embeds a search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of documents, preserving order.
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}

#[async_trait]
impl<T> TextEmbedder for std::sync::Arc<T>
where
    T: TextEmbedder + ?Sized,
{
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn ndims(&self) -> usize {
        (**self).ndims()
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_query(text).await
    }

    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        (**self).embed_documents(texts).await
    }
}
