//! Supported embedding backends.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// OpenAI API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Cohere API key.
pub const COHERE_API_KEY: &str = "COHERE_API_KEY";
/// Ollama server URL, optional.
pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";

/// Ollama server used when `OLLAMA_BASE_URL` is unset.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Embedding providers the factory can build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum EmbeddingBackend {
    /// OpenAI embeddings API.
    #[strum(serialize = "openai")]
    OpenAi,
    /// Cohere embed API.
    Cohere,
    /// Local Ollama server.
    Ollama,
}

impl EmbeddingBackend {
    /// Returns the embedding size of a known model, or 0.
    pub fn dimensions(self, model: &str) -> usize {
        match (self, model) {
            (Self::OpenAi, "text-embedding-3-large") => 3072,
            (Self::OpenAi, "text-embedding-3-small" | "text-embedding-ada-002") => 1536,
            (Self::Cohere, "embed-english-v3.0" | "embed-multilingual-v3.0") => 1024,
            (Self::Cohere, "embed-english-light-v3.0" | "embed-multilingual-light-v3.0") => 384,
            (Self::Cohere, "embed-english-v2.0") => 4096,
            (Self::Ollama, "nomic-embed-text") => 768,
            (Self::Ollama, "mxbai-embed-large") => 1024,
            (Self::Ollama, "all-minilm") => 384,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(
            EmbeddingBackend::from_str("openai").unwrap(),
            EmbeddingBackend::OpenAi
        );
        assert_eq!(
            EmbeddingBackend::from_str("ollama").unwrap(),
            EmbeddingBackend::Ollama
        );
        assert!(EmbeddingBackend::from_str("voyage").is_err());
        assert_eq!(EmbeddingBackend::Cohere.as_ref(), "cohere");
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(
            EmbeddingBackend::OpenAi.dimensions("text-embedding-3-small"),
            1536
        );
        assert_eq!(EmbeddingBackend::Ollama.dimensions("my-custom-model"), 0);
    }
}
