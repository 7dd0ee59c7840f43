//! Embedding provider abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use ragkit_core::TextEmbedder;
use rig::embeddings::{Embedding, EmbeddingError, EmbeddingModel as RigEmbeddingModel};
use rig::providers::{cohere, ollama, openai};

use super::EmbeddingBackend;
use crate::TRACING_TARGET_EMBEDDING;
use crate::client::Transport;
use crate::error::Error;

/// Embedding provider that wraps different rig embedding model implementations.
///
/// This is a cheaply cloneable wrapper around an `Arc<EmbeddingService>`.
#[derive(Clone)]
pub struct EmbeddingProvider {
    service: Arc<EmbeddingService>,
    transport: Transport,
    base_url: Option<String>,
}

pub(crate) enum EmbeddingService {
    OpenAi {
        model: openai::EmbeddingModel,
        model_name: String,
    },
    Cohere {
        query_model: cohere::EmbeddingModel,
        document_model: cohere::EmbeddingModel,
        model_name: String,
    },
    Ollama {
        client: ollama::Client,
        model_name: String,
        ndims: usize,
    },
}

impl EmbeddingProvider {
    pub(crate) fn new(
        service: EmbeddingService,
        transport: Transport,
        base_url: Option<String>,
    ) -> Self {
        Self {
            service: Arc::new(service),
            transport,
            base_url,
        }
    }

    /// Returns the backend.
    pub fn backend(&self) -> EmbeddingBackend {
        match self.service.as_ref() {
            EmbeddingService::OpenAi { .. } => EmbeddingBackend::OpenAi,
            EmbeddingService::Cohere { .. } => EmbeddingBackend::Cohere,
            EmbeddingService::Ollama { .. } => EmbeddingBackend::Ollama,
        }
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        match self.service.as_ref() {
            EmbeddingService::OpenAi { model_name, .. } => model_name,
            EmbeddingService::Cohere { model_name, .. } => model_name,
            EmbeddingService::Ollama { model_name, .. } => model_name,
        }
    }

    /// Returns the provider name.
    pub fn provider_name(&self) -> &'static str {
        self.backend().into()
    }

    /// Returns how the client reaches its provider.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Returns the endpoint override, if the client has one.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Returns the number of dimensions, or 0 when unknown.
    pub fn ndims(&self) -> usize {
        match self.service.as_ref() {
            EmbeddingService::OpenAi { model, .. } => model.ndims(),
            EmbeddingService::Cohere { query_model, .. } => query_model.ndims(),
            EmbeddingService::Ollama { ndims, .. } => *ndims,
        }
    }

    /// Embed a search query.
    pub async fn embed_text(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        match self.service.as_ref() {
            EmbeddingService::OpenAi { model, .. } => model.embed_text(text).await,
            EmbeddingService::Cohere { query_model, .. } => query_model.embed_text(text).await,
            EmbeddingService::Ollama {
                client,
                model_name,
                ndims,
            } => {
                let model = ollama::EmbeddingModel::new(client.clone(), model_name, *ndims);
                model.embed_text(text).await
            }
        }
    }

    /// Embed multiple documents.
    pub async fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        match self.service.as_ref() {
            EmbeddingService::OpenAi { model, .. } => model.embed_texts(texts).await,
            EmbeddingService::Cohere { document_model, .. } => {
                document_model.embed_texts(texts).await
            }
            EmbeddingService::Ollama {
                client,
                model_name,
                ndims,
            } => {
                let model = ollama::EmbeddingModel::new(client.clone(), model_name, *ndims);
                model.embed_texts(texts).await
            }
        }
    }

    fn map_err(&self, err: EmbeddingError) -> ragkit_core::Error {
        Error::provider(self.provider_name(), err).into()
    }
}

#[async_trait]
impl TextEmbedder for EmbeddingProvider {
    fn model_name(&self) -> &str {
        EmbeddingProvider::model_name(self)
    }

    fn provider_name(&self) -> &str {
        EmbeddingProvider::provider_name(self)
    }

    fn ndims(&self) -> usize {
        EmbeddingProvider::ndims(self)
    }

    async fn embed_query(&self, text: &str) -> ragkit_core::Result<Vec<f32>> {
        tracing::trace!(
            target: TRACING_TARGET_EMBEDDING,
            provider = %self.provider_name(),
            model = %self.model_name(),
            "Embedding query"
        );

        let embedding = self.embed_text(text).await.map_err(|e| self.map_err(e))?;
        Ok(to_f32(embedding))
    }

    async fn embed_documents(&self, texts: Vec<String>) -> ragkit_core::Result<Vec<Vec<f32>>> {
        tracing::trace!(
            target: TRACING_TARGET_EMBEDDING,
            provider = %self.provider_name(),
            model = %self.model_name(),
            count = texts.len(),
            "Embedding documents"
        );

        let embeddings = self.embed_texts(texts).await.map_err(|e| self.map_err(e))?;
        Ok(embeddings.into_iter().map(to_f32).collect())
    }
}

fn to_f32(embedding: Embedding) -> Vec<f32> {
    embedding.vec.into_iter().map(|v| v as f32).collect()
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.service.as_ref() {
            EmbeddingService::OpenAi { .. } => "EmbeddingProvider::OpenAi",
            EmbeddingService::Cohere { .. } => "EmbeddingProvider::Cohere",
            EmbeddingService::Ollama { .. } => "EmbeddingProvider::Ollama",
        };
        f.debug_struct(name)
            .field("model", &self.model_name())
            .field("ndims", &self.ndims())
            .field("transport", &self.transport)
            .finish()
    }
}
