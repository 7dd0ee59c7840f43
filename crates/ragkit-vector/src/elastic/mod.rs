//! Elasticsearch vector store backend.

mod backend;
mod config;

pub use backend::ElasticBackend;
pub use config::{
    DEFAULT_INDEX_NAME, ELASTICSEARCH_API_KEY, ELASTICSEARCH_PASSWORD, ELASTICSEARCH_URL,
    ELASTICSEARCH_USER, ElasticAuth, ElasticConfig,
};
