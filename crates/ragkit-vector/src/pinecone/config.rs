//! Pinecone configuration.

use ragkit_core::{Environment, Result};

/// Name of an existing index.
pub const PINECONE_INDEX_NAME: &str = "PINECONE_INDEX_NAME";
/// Pinecone API key.
pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";

/// Pinecone configuration.
#[derive(Clone, PartialEq)]
pub struct PineconeConfig {
    /// Pinecone API key.
    pub api_key: String,
    /// Index name.
    pub index: String,
    /// Namespace (optional).
    pub namespace: Option<String>,
    /// Metadata key holding the page content.
    pub text_key: String,
}

impl PineconeConfig {
    /// Creates a new Pinecone configuration.
    pub fn new(api_key: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            index: index.into(),
            namespace: None,
            text_key: default_text_key(),
        }
    }

    /// Resolves the configuration from `PINECONE_INDEX_NAME` and `PINECONE_API_KEY`.
    pub fn from_env(env: &Environment) -> Result<Self> {
        let index = env.require(PINECONE_INDEX_NAME)?;
        let api_key = env.require(PINECONE_API_KEY)?;
        Ok(Self::new(api_key, index))
    }

    /// Sets the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the metadata key holding the page content.
    pub fn with_text_key(mut self, text_key: impl Into<String>) -> Self {
        self.text_key = text_key.into();
        self
    }
}

impl std::fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("index", &self.index)
            .field("namespace", &self.namespace)
            .field("text_key", &self.text_key)
            .finish_non_exhaustive()
    }
}

fn default_text_key() -> String {
    "text".to_string()
}
