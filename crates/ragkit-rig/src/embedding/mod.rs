//! Embedding clients.

mod backend;
mod factory;
mod provider;

pub use backend::{
    COHERE_API_KEY, DEFAULT_OLLAMA_BASE_URL, EmbeddingBackend, OLLAMA_BASE_URL, OPENAI_API_KEY,
};
pub use factory::{make_proxied_text_encoder, make_text_encoder};
pub use provider::EmbeddingProvider;
