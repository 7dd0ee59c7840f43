//! Vector store error types.

use ragkit_core::{Error, ErrorKind};
use thiserror::Error;

/// Result type for vector store operations.
pub type VectorResult<T> = Result<T, VectorError>;

/// Vector store errors.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Index or collection not found.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Stored metadata could not be decoded.
    #[error("metadata decode error: {0}")]
    MetadataDecode(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl VectorError {
    /// Creates a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a collection not found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound(name.into())
    }

    /// Creates an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a metadata decode error.
    pub fn metadata_decode(msg: impl Into<String>) -> Self {
        Self::MetadataDecode(msg.into())
    }

    /// Creates a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Creates a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Returns the core error kind this error maps to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) | Self::CollectionNotFound(_) => ErrorKind::BackendUnavailable,
            Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::MetadataDecode(_) => ErrorKind::MetadataDecode,
            Self::Backend(_) => ErrorKind::Provider,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<VectorError> for Error {
    fn from(err: VectorError) -> Self {
        Error::new(err.kind())
            .with_message(err.to_string())
            .with_source(err)
    }
}
