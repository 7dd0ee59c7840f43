//! Pinecone vector store backend.

mod backend;
mod config;

pub use backend::PineconeBackend;
pub use config::{PINECONE_API_KEY, PINECONE_INDEX_NAME, PineconeConfig};
