//! Chat model loading.
//!
//! [`load_chat_model`] resolves a `provider/model` string into a
//! [`ChatModel`]. GigaChat is served by a dedicated REST client and xAI is
//! always pinned to temperature 0; the remaining providers share one
//! generic path built on rig clients.

mod gigachat;
mod loader;
mod message;
mod model;
mod provider;

pub use gigachat::{
    GIGACHAT_AUTH_URL, GIGACHAT_BASE_URL, GIGACHAT_CREDENTIALS, GIGACHAT_DEFAULT_AUTH_URL,
    GIGACHAT_DEFAULT_BASE_URL, GIGACHAT_DEFAULT_MODEL, GIGACHAT_DEFAULT_SCOPE, GigaChatConfig,
};
pub use loader::load_chat_model;
pub use message::{ChatMessage, ChatResponse, ChatRole};
pub use model::{ChatModel, ChatParams};
pub use provider::{
    ANTHROPIC_API_KEY, ChatProvider, DEEPSEEK_API_KEY, GEMINI_API_KEY, GROQ_API_KEY,
    MISTRAL_API_KEY, PERPLEXITY_API_KEY, XAI_API_KEY,
};
