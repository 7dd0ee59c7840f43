//! Elasticsearch configuration.

use ragkit_core::{Environment, Result};

/// Cluster URL.
pub const ELASTICSEARCH_URL: &str = "ELASTICSEARCH_URL";
/// Basic auth user, self-hosted clusters only.
pub const ELASTICSEARCH_USER: &str = "ELASTICSEARCH_USER";
/// Basic auth password, self-hosted clusters only.
pub const ELASTICSEARCH_PASSWORD: &str = "ELASTICSEARCH_PASSWORD";
/// API key, cloud clusters only.
pub const ELASTICSEARCH_API_KEY: &str = "ELASTICSEARCH_API_KEY";

/// Index queried by the retriever.
pub const DEFAULT_INDEX_NAME: &str = "langchain_index";

/// Elasticsearch credentials.
#[derive(Clone, PartialEq)]
pub enum ElasticAuth {
    /// HTTP basic auth.
    Basic { username: String, password: String },
    /// `Authorization: ApiKey` header.
    ApiKey { api_key: String },
}

impl std::fmt::Debug for ElasticAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::ApiKey { .. } => f.debug_struct("ApiKey").field("api_key", &"***").finish(),
        }
    }
}

/// Elasticsearch configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ElasticConfig {
    /// Cluster URL.
    pub url: String,
    /// Credentials.
    pub auth: ElasticAuth,
    /// Index name.
    pub index_name: String,
    /// Vector field name.
    pub vector_field: String,
    /// Text field name.
    pub text_field: String,
}

impl ElasticConfig {
    /// Creates a new Elasticsearch configuration.
    pub fn new(url: impl Into<String>, auth: ElasticAuth) -> Self {
        Self {
            url: url.into(),
            auth,
            index_name: default_index_name(),
            vector_field: default_vector_field(),
            text_field: default_text_field(),
        }
    }

    /// Resolves a self-hosted cluster with basic auth.
    ///
    /// Requires `ELASTICSEARCH_URL`, `ELASTICSEARCH_USER` and `ELASTICSEARCH_PASSWORD`.
    pub fn from_env_basic(env: &Environment) -> Result<Self> {
        let url = env.require(ELASTICSEARCH_URL)?;
        let auth = ElasticAuth::Basic {
            username: env.require(ELASTICSEARCH_USER)?.to_owned(),
            password: env.require(ELASTICSEARCH_PASSWORD)?.to_owned(),
        };
        Ok(Self::new(url, auth))
    }

    /// Resolves a cloud cluster with API key auth.
    ///
    /// Requires `ELASTICSEARCH_URL` and `ELASTICSEARCH_API_KEY`.
    pub fn from_env_api_key(env: &Environment) -> Result<Self> {
        let url = env.require(ELASTICSEARCH_URL)?;
        let auth = ElasticAuth::ApiKey {
            api_key: env.require(ELASTICSEARCH_API_KEY)?.to_owned(),
        };
        Ok(Self::new(url, auth))
    }

    /// Sets the index name.
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Sets the vector field name.
    pub fn with_vector_field(mut self, field: impl Into<String>) -> Self {
        self.vector_field = field.into();
        self
    }

    /// Sets the text field name.
    pub fn with_text_field(mut self, field: impl Into<String>) -> Self {
        self.text_field = field.into();
        self
    }
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_vector_field() -> String {
    "vector".to_string()
}

fn default_text_field() -> String {
    "text".to_string()
}
