//! Retrieval configuration.

use std::str::FromStr;

use ragkit_core::{Error, Result, SearchKwargs};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Embedding model used when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "openai/text-embedding-3-small";

/// Vector store backing the retriever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[derive(EnumString, EnumIter, Display, AsRefStr, IntoStaticStr)]
pub enum RetrieverProvider {
    /// Elastic Cloud, API key auth.
    #[default]
    #[serde(rename = "elastic")]
    #[strum(serialize = "elastic")]
    Elastic,
    /// Self-hosted Elasticsearch, basic auth.
    #[serde(rename = "elastic-local")]
    #[strum(serialize = "elastic-local")]
    ElasticLocal,
    /// Pinecone.
    #[serde(rename = "pinecone")]
    #[strum(serialize = "pinecone")]
    Pinecone,
    /// MongoDB Atlas vector search.
    #[serde(rename = "mongodb")]
    #[strum(serialize = "mongodb")]
    MongoDb,
    /// PostgreSQL with pgvector.
    #[serde(rename = "pgvector")]
    #[strum(serialize = "pgvector")]
    PgVector,
}

impl RetrieverProvider {
    /// Parses a provider name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error listing the accepted values.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value).map_err(|_| {
            let expected = Self::iter()
                .map(|p| p.as_ref().to_owned())
                .collect::<Vec<_>>()
                .join(", ");
            Error::configuration().with_message(format!(
                "unrecognized retriever_provider `{value}`, expected one of: {expected}"
            ))
        })
    }
}

impl<'de> Deserialize<'de> for RetrieverProvider {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Settings that select and parameterize the retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Vector store to retrieve from.
    #[serde(default)]
    pub retriever_provider: RetrieverProvider,
    /// Embedding model as `provider/model`.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Backend search parameters.
    #[serde(default)]
    pub search_kwargs: SearchKwargs,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            retriever_provider: RetrieverProvider::default(),
            embedding_model: default_embedding_model(),
            search_kwargs: SearchKwargs::default(),
        }
    }
}

impl Configuration {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retriever provider.
    pub fn with_retriever_provider(mut self, provider: RetrieverProvider) -> Self {
        self.retriever_provider = provider;
        self
    }

    /// Sets the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Sets the search parameters.
    pub fn with_search_kwargs(mut self, search_kwargs: SearchKwargs) -> Self {
        self.search_kwargs = search_kwargs;
        self
    }

    /// Deserializes a configuration from a JSON object.
    ///
    /// Missing fields take their defaults and unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a field has the wrong shape or
    /// names an unknown provider.
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::configuration()
                .with_message(e.to_string())
                .with_source(e)
        })
    }

    /// Reads the `configurable` mapping of a runnable config.
    ///
    /// A config without `configurable` yields the defaults.
    pub fn from_runnable_config(config: &Value) -> Result<Self> {
        match config.get("configurable") {
            Some(configurable) => Self::from_json(configurable.clone()),
            None => Ok(Self::default()),
        }
    }
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = Configuration::from_json(json!({})).unwrap();
        assert_eq!(config.retriever_provider, RetrieverProvider::Elastic);
        assert_eq!(config.embedding_model, "openai/text-embedding-3-small");
        assert!(config.search_kwargs.as_map().is_empty());
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_all_fields_from_json() {
        let config = Configuration::from_json(json!({
            "retriever_provider": "pgvector",
            "embedding_model": "ollama/nomic-embed-text",
            "search_kwargs": {"k": 8, "filter": {"user_id": "u1"}},
            "thread_id": "ignored"
        }))
        .unwrap();

        assert_eq!(config.retriever_provider, RetrieverProvider::PgVector);
        assert_eq!(config.embedding_model, "ollama/nomic-embed-text");
        assert_eq!(config.search_kwargs.k(), 8);
        assert!(config.search_kwargs.filter().is_some());
    }

    #[test]
    fn test_unknown_provider_lists_values() {
        let err = Configuration::from_json(json!({"retriever_provider": "redis"})).unwrap_err();
        assert!(err.is_configuration());

        let message = err.to_string();
        assert!(message.contains("redis"));
        assert!(message.contains("elastic, elastic-local, pinecone, mongodb, pgvector"));
    }

    #[test]
    fn test_provider_names_round_trip() {
        for provider in RetrieverProvider::iter() {
            assert_eq!(RetrieverProvider::parse(provider.as_ref()).unwrap(), provider);
            assert_eq!(
                serde_json::to_value(provider).unwrap(),
                json!(provider.to_string())
            );
        }
    }

    #[test]
    fn test_runnable_config() {
        let config = Configuration::from_runnable_config(&json!({
            "configurable": {"retriever_provider": "mongodb"},
            "tags": ["x"]
        }))
        .unwrap();
        assert_eq!(config.retriever_provider, RetrieverProvider::MongoDb);

        let config = Configuration::from_runnable_config(&json!({"tags": []})).unwrap();
        assert_eq!(config, Configuration::default());
    }
}
