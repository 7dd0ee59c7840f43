//! pgvector configuration.

use ragkit_core::{Environment, Result};

use crate::mask::mask_url;

/// PostgreSQL connection string.
pub const PGVECTOR_CONNECTION_STRING: &str = "PGVECTOR_CONNECTION_STRING";
/// Collection name, optional.
pub const PGVECTOR_COLLECTION_NAME: &str = "PGVECTOR_COLLECTION_NAME";

/// Collection used when `PGVECTOR_COLLECTION_NAME` is unset.
pub const DEFAULT_COLLECTION_NAME: &str = "langchain";

/// PostgreSQL pgvector configuration.
#[derive(Clone, PartialEq)]
pub struct PgVectorConfig {
    /// PostgreSQL connection URL.
    pub connection_url: String,
    /// Collection name.
    pub collection_name: String,
    /// Read metadata from a JSONB column rather than a JSON column.
    pub use_jsonb: bool,
    /// An embedding client is attached; distances are reported as scores.
    pub with_embeddings: bool,
    /// Maximum number of pooled connections.
    pub max_connections: usize,
}

impl PgVectorConfig {
    /// Creates a new pgvector configuration.
    pub fn new(connection_url: impl Into<String>) -> Self {
        Self {
            connection_url: connection_url.into(),
            collection_name: default_collection_name(),
            use_jsonb: true,
            with_embeddings: true,
            max_connections: default_max_connections(),
        }
    }

    /// Resolves the configuration from the environment.
    ///
    /// `PGVECTOR_CONNECTION_STRING` is required; `PGVECTOR_COLLECTION_NAME`
    /// defaults to `langchain`.
    pub fn from_env(env: &Environment) -> Result<Self> {
        let connection_url = env.require(PGVECTOR_CONNECTION_STRING)?;
        let collection_name = env.get_or(PGVECTOR_COLLECTION_NAME, DEFAULT_COLLECTION_NAME);
        Ok(Self::new(connection_url).with_collection_name(collection_name))
    }

    /// Sets the collection name.
    pub fn with_collection_name(mut self, collection_name: impl Into<String>) -> Self {
        self.collection_name = collection_name.into();
        self
    }

    /// Selects the JSONB or JSON metadata path.
    pub fn with_use_jsonb(mut self, use_jsonb: bool) -> Self {
        self.use_jsonb = use_jsonb;
        self
    }

    /// Marks whether an embedding client is attached.
    pub fn with_embeddings(mut self, with_embeddings: bool) -> Self {
        self.with_embeddings = with_embeddings;
        self
    }

    /// Sets the maximum number of pooled connections.
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Returns the connection URL with the password masked.
    pub fn connection_url_masked(&self) -> String {
        mask_url(&self.connection_url)
    }
}

impl std::fmt::Debug for PgVectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgVectorConfig")
            .field("connection_url", &self.connection_url_masked())
            .field("collection_name", &self.collection_name)
            .field("use_jsonb", &self.use_jsonb)
            .field("with_embeddings", &self.with_embeddings)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

fn default_collection_name() -> String {
    DEFAULT_COLLECTION_NAME.to_string()
}

fn default_max_connections() -> usize {
    4
}
