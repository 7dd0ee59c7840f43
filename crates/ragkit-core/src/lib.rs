#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod document;
mod embedder;
mod env;
mod error;
mod retriever;
mod search;

pub use document::{Document, Metadata, ScoredDocument};
pub use embedder::TextEmbedder;
pub use env::Environment;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use retriever::Retriever;
pub use search::{DEFAULT_K, SearchKwargs};

/// Tracing target for core operations.
pub const TRACING_TARGET: &str = "ragkit_core";
