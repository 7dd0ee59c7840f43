//! Retriever over a vector store.

use std::sync::Arc;

use async_trait::async_trait;
use ragkit_core::{Result, Retriever, ScoredDocument, SearchKwargs, TextEmbedder};

use crate::TRACING_TARGET;
use crate::store::VectorStore;

/// Retriever that embeds the query and searches a vector store.
///
/// This is a cheaply cloneable wrapper around an `Arc`.
#[derive(Clone)]
pub struct VectorStoreRetriever(Arc<RetrieverInner>);

struct RetrieverInner {
    store: VectorStore,
    embedder: Arc<dyn TextEmbedder>,
    search_kwargs: SearchKwargs,
}

impl VectorStoreRetriever {
    /// Creates a retriever over `store`, taking ownership of the embedder.
    pub fn new(
        store: VectorStore,
        embedder: Arc<dyn TextEmbedder>,
        search_kwargs: SearchKwargs,
    ) -> Self {
        Self(Arc::new(RetrieverInner {
            store,
            embedder,
            search_kwargs,
        }))
    }

    /// Returns the search parameters.
    pub fn search_kwargs(&self) -> &SearchKwargs {
        &self.0.search_kwargs
    }

    /// Returns the backend name.
    pub fn backend_name(&self) -> &'static str {
        self.0.store.backend_name()
    }

    /// Returns the embedding client.
    pub fn embedder(&self) -> &Arc<dyn TextEmbedder> {
        &self.0.embedder
    }

    /// Releases the backend connection.
    pub async fn close(&self) -> Result<()> {
        self.0.store.close().await.map_err(Into::into)
    }
}

#[async_trait]
impl Retriever for VectorStoreRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<ScoredDocument>> {
        let inner = &self.0;
        let vector = inner.embedder.embed_query(query).await?;
        let mut docs = inner
            .store
            .similarity_search(vector, &inner.search_kwargs)
            .await?;

        if let Some(threshold) = inner.search_kwargs.score_threshold() {
            let order = inner.store.score_order();
            docs.retain(|doc| doc.score.is_some_and(|score| order.passes(score, threshold)));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            backend = %inner.store.backend_name(),
            results = %docs.len(),
            "Retrieved documents"
        );

        Ok(docs)
    }
}

impl std::fmt::Debug for VectorStoreRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStoreRetriever")
            .field("backend", &self.0.store.backend_name())
            .field("embedding_model", &self.0.embedder.model_name())
            .field("search_kwargs", &self.0.search_kwargs)
            .finish()
    }
}
