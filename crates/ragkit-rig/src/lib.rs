#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod chat;
mod client;
pub mod embedding;
mod error;
pub mod proxy;

pub use client::{Transport, split_model_name};
pub use error::{Error, Result};

/// Tracing target for proxy configuration.
pub const TRACING_TARGET_PROXY: &str = "ragkit_rig::proxy";

/// Tracing target for embedding clients.
pub const TRACING_TARGET_EMBEDDING: &str = "ragkit_rig::embedding";

/// Tracing target for chat models.
pub const TRACING_TARGET_CHAT: &str = "ragkit_rig::chat";
