//! Chat provider identifiers.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use super::gigachat::GIGACHAT_CREDENTIALS;
use crate::embedding::{COHERE_API_KEY, OPENAI_API_KEY};

/// Anthropic API key variable.
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Gemini API key variable.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Mistral API key variable.
pub const MISTRAL_API_KEY: &str = "MISTRAL_API_KEY";
/// Groq API key variable.
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
/// DeepSeek API key variable.
pub const DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";
/// Perplexity API key variable.
pub const PERPLEXITY_API_KEY: &str = "PERPLEXITY_API_KEY";
/// xAI API key variable.
pub const XAI_API_KEY: &str = "XAI_API_KEY";

/// Chat model providers accepted by [`load_chat_model`].
///
/// [`load_chat_model`]: crate::chat::load_chat_model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumString, EnumIter, Display, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChatProvider {
    /// OpenAI chat completions.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Cohere chat.
    Cohere,
    /// Google Gemini.
    Gemini,
    /// Mistral AI.
    Mistral,
    /// Groq.
    Groq,
    /// DeepSeek.
    DeepSeek,
    /// Perplexity.
    Perplexity,
    /// Local Ollama server, no key.
    Ollama,
    /// xAI Grok models.
    Xai,
    /// Sber GigaChat, served by its own client.
    GigaChat,
}

impl ChatProvider {
    /// Environment variable holding the provider's credentials.
    ///
    /// Returns `None` for providers that run without a key.
    pub fn key_var(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some(OPENAI_API_KEY),
            Self::Anthropic => Some(ANTHROPIC_API_KEY),
            Self::Cohere => Some(COHERE_API_KEY),
            Self::Gemini => Some(GEMINI_API_KEY),
            Self::Mistral => Some(MISTRAL_API_KEY),
            Self::Groq => Some(GROQ_API_KEY),
            Self::DeepSeek => Some(DEEPSEEK_API_KEY),
            Self::Perplexity => Some(PERPLEXITY_API_KEY),
            Self::Xai => Some(XAI_API_KEY),
            Self::GigaChat => Some(GIGACHAT_CREDENTIALS),
            Self::Ollama => None,
        }
    }

    /// Infers the provider from a bare model name.
    pub fn infer(model: &str) -> Option<Self> {
        const PREFIXES: &[(&str, ChatProvider)] = &[
            ("gpt-", ChatProvider::OpenAi),
            ("o1", ChatProvider::OpenAi),
            ("o3", ChatProvider::OpenAi),
            ("o4", ChatProvider::OpenAi),
            ("claude", ChatProvider::Anthropic),
            ("command", ChatProvider::Cohere),
            ("gemini", ChatProvider::Gemini),
            ("mistral", ChatProvider::Mistral),
            ("deepseek", ChatProvider::DeepSeek),
            ("sonar", ChatProvider::Perplexity),
            ("grok", ChatProvider::Xai),
        ];

        let model = model.to_ascii_lowercase();
        PREFIXES
            .iter()
            .find_map(|(prefix, provider)| model.starts_with(prefix).then_some(*provider))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ChatProvider::from_str("openai").unwrap(), ChatProvider::OpenAi);
        assert_eq!(ChatProvider::from_str("Ollama").unwrap(), ChatProvider::Ollama);
        assert_eq!(ChatProvider::from_str("gigachat").unwrap(), ChatProvider::GigaChat);
        assert!(ChatProvider::from_str("bedrock").is_err());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ChatProvider::DeepSeek.to_string(), "deepseek");
        assert_eq!(ChatProvider::Xai.as_ref(), "xai");
    }

    #[test]
    fn test_infer_from_prefix() {
        assert_eq!(ChatProvider::infer("gpt-4o-mini"), Some(ChatProvider::OpenAi));
        assert_eq!(ChatProvider::infer("o3-mini"), Some(ChatProvider::OpenAi));
        assert_eq!(
            ChatProvider::infer("claude-3-5-sonnet-latest"),
            Some(ChatProvider::Anthropic)
        );
        assert_eq!(ChatProvider::infer("command-r-plus"), Some(ChatProvider::Cohere));
        assert_eq!(ChatProvider::infer("sonar-pro"), Some(ChatProvider::Perplexity));
        assert_eq!(ChatProvider::infer("grok-2"), Some(ChatProvider::Xai));
        assert_eq!(ChatProvider::infer("llama3"), None);
    }

    #[test]
    fn test_ollama_has_no_key() {
        assert_eq!(ChatProvider::Ollama.key_var(), None);
        assert_eq!(ChatProvider::Xai.key_var(), Some(XAI_API_KEY));
    }
}
