#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod configuration;
mod factory;

pub use configuration::{Configuration, DEFAULT_EMBEDDING_MODEL, RetrieverProvider};
pub use factory::{RetrieverGuard, make_retriever, resolve_backend, with_retriever};

/// Tracing target for retriever construction.
pub const TRACING_TARGET: &str = "ragkit_retrieval";
