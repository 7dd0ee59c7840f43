//! Vector store trait and dispatch.

use async_trait::async_trait;
use ragkit_core::{ScoredDocument, SearchKwargs};

use crate::TRACING_TARGET;
use crate::elastic::{ElasticBackend, ElasticConfig};
use crate::error::VectorResult;
use crate::mongo::{MongoBackend, MongoConfig};
use crate::pgvector::{PgVectorBackend, PgVectorConfig};
use crate::pinecone::{PineconeBackend, PineconeConfig};

/// How a backend's scores rank documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreOrder {
    /// Similarity: larger scores are closer.
    #[default]
    HigherIsBetter,
    /// Distance: smaller scores are closer.
    LowerIsBetter,
}

impl ScoreOrder {
    /// Returns true when `score` passes `threshold`.
    pub fn passes(self, score: f32, threshold: f32) -> bool {
        match self {
            Self::HigherIsBetter => score >= threshold,
            Self::LowerIsBetter => score <= threshold,
        }
    }
}

/// Trait for vector store backends.
#[async_trait]
pub trait VectorStoreBackend: Send + Sync {
    /// Returns documents closest to `query`, most relevant first.
    async fn similarity_search(
        &self,
        query: Vec<f32>,
        kwargs: &SearchKwargs,
    ) -> VectorResult<Vec<ScoredDocument>>;

    /// Returns how scores from this backend rank documents.
    fn score_order(&self) -> ScoreOrder {
        ScoreOrder::default()
    }

    /// Releases the underlying connection.
    ///
    /// Called once when the owning retriever goes out of scope.
    async fn close(&self) -> VectorResult<()>;
}

/// Vector store backend configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorStoreConfig {
    /// Elasticsearch, self-hosted or cloud.
    Elastic(ElasticConfig),
    /// Pinecone managed vector database.
    Pinecone(PineconeConfig),
    /// MongoDB Atlas vector search.
    MongoDb(MongoConfig),
    /// PostgreSQL with pgvector extension.
    PgVector(PgVectorConfig),
}

impl VectorStoreConfig {
    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Elastic(_) => "elastic",
            Self::Pinecone(_) => "pinecone",
            Self::MongoDb(_) => "mongodb",
            Self::PgVector(_) => "pgvector",
        }
    }
}

impl From<ElasticConfig> for VectorStoreConfig {
    fn from(config: ElasticConfig) -> Self {
        Self::Elastic(config)
    }
}

impl From<PineconeConfig> for VectorStoreConfig {
    fn from(config: PineconeConfig) -> Self {
        Self::Pinecone(config)
    }
}

impl From<MongoConfig> for VectorStoreConfig {
    fn from(config: MongoConfig) -> Self {
        Self::MongoDb(config)
    }
}

impl From<PgVectorConfig> for VectorStoreConfig {
    fn from(config: PgVectorConfig) -> Self {
        Self::PgVector(config)
    }
}

/// Unified vector store that wraps backend implementations.
pub struct VectorStore {
    backend_name: &'static str,
    backend: Box<dyn VectorStoreBackend>,
}

impl VectorStore {
    /// Connects to the backend described by `config`.
    pub async fn connect(config: VectorStoreConfig) -> VectorResult<Self> {
        let backend: Box<dyn VectorStoreBackend> = match &config {
            VectorStoreConfig::Elastic(cfg) => Box::new(ElasticBackend::connect(cfg).await?),
            VectorStoreConfig::Pinecone(cfg) => Box::new(PineconeBackend::connect(cfg).await?),
            VectorStoreConfig::MongoDb(cfg) => Box::new(MongoBackend::connect(cfg).await?),
            VectorStoreConfig::PgVector(cfg) => Box::new(PgVectorBackend::connect(cfg).await?),
        };

        tracing::info!(
            target: TRACING_TARGET,
            backend = %config.backend_name(),
            "Vector store connected"
        );

        Ok(Self::from_backend(config.backend_name(), backend))
    }

    /// Wraps an already connected backend.
    pub fn from_backend(backend_name: &'static str, backend: Box<dyn VectorStoreBackend>) -> Self {
        Self {
            backend_name,
            backend,
        }
    }

    /// Returns the backend name.
    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    /// Returns how the backend's scores rank documents.
    pub fn score_order(&self) -> ScoreOrder {
        self.backend.score_order()
    }

    /// Searches for documents similar to the query vector.
    pub async fn similarity_search(
        &self,
        query: Vec<f32>,
        kwargs: &SearchKwargs,
    ) -> VectorResult<Vec<ScoredDocument>> {
        tracing::debug!(
            target: TRACING_TARGET,
            backend = %self.backend_name,
            k = %kwargs.k(),
            "Searching vectors"
        );
        self.backend.similarity_search(query, kwargs).await
    }

    /// Releases the backend connection.
    pub async fn close(&self) -> VectorResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            backend = %self.backend_name,
            "Closing vector store"
        );
        self.backend.close().await
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("backend", &self.backend_name)
            .finish()
    }
}
