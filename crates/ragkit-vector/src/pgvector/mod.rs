//! PostgreSQL pgvector backend.
//!
//! Reads the schema written by langchain-postgres: a `langchain_pg_collection`
//! table of named collections and a `langchain_pg_embedding` table holding
//! one row per document.

mod backend;
mod config;
mod metadata;

pub use backend::{EmbeddingRow, PgVectorBackend, results_to_docs_and_scores};
pub use config::{
    DEFAULT_COLLECTION_NAME, PGVECTOR_COLLECTION_NAME, PGVECTOR_CONNECTION_STRING, PgVectorConfig,
};
pub use metadata::{RawMetadata, normalize_metadata};
