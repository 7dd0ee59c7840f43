//! Error types for ragkit-rig.

use std::fmt;

use ragkit_core::ErrorKind;

/// Result type alias for rig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or calling models.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider error (client construction or API call failed).
    #[error("provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// Provider name not supported by the factory.
    #[error("unknown {kind} provider `{provider}`, expected one of: {expected}")]
    UnknownProvider {
        kind: &'static str,
        provider: String,
        expected: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Request could not be built from the given input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a provider error.
    pub fn provider(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates an unknown provider error listing the accepted values.
    pub fn unknown_provider(
        kind: &'static str,
        provider: impl fmt::Display,
        expected: impl IntoIterator<Item = impl fmt::Display>,
    ) -> Self {
        Self::UnknownProvider {
            kind,
            provider: provider.to_string(),
            expected: expected
                .into_iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl fmt::Display) -> Self {
        Self::InvalidRequest(message.to_string())
    }

    /// Returns the core error kind this error maps to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provider { .. } => ErrorKind::Provider,
            Self::UnknownProvider { .. } | Self::Config(_) => ErrorKind::Configuration,
            Self::InvalidRequest(_) => ErrorKind::InvalidInput,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

impl From<Error> for ragkit_core::Error {
    fn from(err: Error) -> Self {
        ragkit_core::Error::new(err.kind())
            .with_message(err.to_string())
            .with_source(err)
    }
}
