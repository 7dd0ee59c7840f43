#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod elastic;
pub mod mongo;
pub mod pgvector;
pub mod pinecone;

mod error;
mod mask;
mod retriever;
mod store;

pub use elastic::{ElasticAuth, ElasticConfig};
pub use error::{VectorError, VectorResult};
pub use mongo::MongoConfig;
pub use pinecone::PineconeConfig;
pub use retriever::VectorStoreRetriever;
pub use store::{ScoreOrder, VectorStore, VectorStoreBackend, VectorStoreConfig};

pub use self::pgvector::{PgVectorConfig, RawMetadata, normalize_metadata};

/// Tracing target for vector store operations.
pub const TRACING_TARGET: &str = "ragkit_vector";
