//! Chat model loader.

use std::str::FromStr;
use std::sync::Arc;

use ragkit_core::Environment;
use rig::client::Nothing;
use rig::prelude::CompletionClient;
use rig::providers::{
    anthropic, cohere, deepseek, gemini, groq, mistral, ollama, openai, perplexity, xai,
};
use serde_json::json;
use strum::IntoEnumIterator;

use super::gigachat::{GigaChatClient, GigaChatConfig};
use super::model::{ChatBackend, ChatParams, RigChat};
use super::{ChatModel, ChatProvider, XAI_API_KEY};
use crate::TRACING_TARGET_CHAT;
use crate::client::{ClientSettings, Transport, split_model_name};
use crate::embedding::{DEFAULT_OLLAMA_BASE_URL, OLLAMA_BASE_URL};
use crate::error::{Error, Result};

/// Loads a chat model from a `provider/model` string.
///
/// A bare model name has its provider inferred from the name prefix.
/// `overrides` replaces the default parameters (`temperature: 0`) wholesale
/// for the generic providers. GigaChat and an explicit `xai/` prefix always
/// run at temperature 0.
///
/// Credentials come from `env`. No network I/O happens here.
///
/// # Errors
///
/// Returns a configuration error when the provider is unknown or cannot be
/// inferred, or when a required key variable is unset.
pub fn load_chat_model(
    fully_specified_name: &str,
    overrides: Option<ChatParams>,
    env: &Environment,
) -> ragkit_core::Result<ChatModel> {
    let (provider, model) = split_model_name(fully_specified_name);
    let explicit = !provider.is_empty();
    let provider = resolve_provider(provider, model)?;

    let chat = match provider {
        ChatProvider::GigaChat => load_gigachat(model, env)?,
        ChatProvider::Xai if explicit => load_xai(model, env)?,
        _ => load_generic(provider, model, overrides, env)?,
    };

    tracing::debug!(
        target: TRACING_TARGET_CHAT,
        provider = %chat.provider(),
        model = %chat.model_name(),
        transport = ?chat.transport(),
        "Chat model loaded"
    );

    Ok(chat)
}

fn resolve_provider(provider: &str, model: &str) -> Result<ChatProvider> {
    if provider.is_empty() {
        return ChatProvider::infer(model).ok_or_else(|| {
            Error::config(format!(
                "cannot infer a provider for model `{model}`, use the `provider/model` form"
            ))
        });
    }

    ChatProvider::from_str(provider)
        .map_err(|_| Error::unknown_provider("chat", provider, ChatProvider::iter()))
}

fn default_params() -> ChatParams {
    let mut params = ChatParams::new();
    params.insert("temperature".into(), json!(0));
    params
}

fn load_gigachat(model: &str, env: &Environment) -> ragkit_core::Result<ChatModel> {
    let config = GigaChatConfig::from_env(env)?.with_model(model);
    let model_name = config.model.clone();
    let base_url = config.base_url.clone();
    let client = GigaChatClient::new(config)?;

    Ok(ChatModel::new(
        ChatProvider::GigaChat,
        model_name,
        default_params(),
        Some(base_url),
        Transport::Default,
        Arc::new(client),
    ))
}

/// xAI always gets an explicit async client, proxied when possible.
fn load_xai(model: &str, env: &Environment) -> ragkit_core::Result<ChatModel> {
    let settings = ClientSettings::direct()
        .with_env_proxy(env)?
        .with_required_key(env, XAI_API_KEY)?;
    let transport = settings.transport;
    let backend = build_backend(ChatProvider::Xai, model, settings)?;

    Ok(ChatModel::new(
        ChatProvider::Xai,
        model,
        default_params(),
        None,
        transport,
        backend,
    ))
}

fn load_generic(
    provider: ChatProvider,
    model: &str,
    overrides: Option<ChatParams>,
    env: &Environment,
) -> ragkit_core::Result<ChatModel> {
    let params = overrides
        .filter(|params| !params.is_empty())
        .unwrap_or_else(default_params);

    let mut settings = ClientSettings::direct().with_env_proxy(env)?;
    if provider == ChatProvider::Ollama {
        settings = settings.with_base_url(env.get_or(OLLAMA_BASE_URL, DEFAULT_OLLAMA_BASE_URL));
    }
    settings = settings.with_gateway(env);
    if let Some(key_var) = provider.key_var() {
        settings = settings.with_required_key(env, key_var)?;
    }

    let base_url = settings.base_url.clone();
    let transport = settings.transport;
    let backend = build_backend(provider, model, settings)?;

    Ok(ChatModel::new(provider, model, params, base_url, transport, backend))
}

/// Builds a rig client for `$module` from resolved settings.
macro_rules! rig_client {
    ($module:ident, $provider:expr, $settings:expr) => {{
        let mut builder =
            $module::Client::<reqwest::Client>::builder().api_key($settings.api_key());
        if let Some(base_url) = $settings.base_url.as_deref() {
            builder = builder.base_url(base_url);
        }
        builder
            .http_client($settings.http_client)
            .build()
            .map_err(|e| Error::provider($provider, e))?
    }};
}

fn build_backend(
    provider: ChatProvider,
    model: &str,
    settings: ClientSettings,
) -> Result<Arc<dyn ChatBackend>> {
    let backend: Arc<dyn ChatBackend> = match provider {
        ChatProvider::OpenAi => {
            let client = rig_client!(openai, provider, settings).completions_api();
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::Anthropic => {
            let client = rig_client!(anthropic, provider, settings);
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::Cohere => {
            let client = rig_client!(cohere, provider, settings);
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::Gemini => {
            let client = rig_client!(gemini, provider, settings);
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::Mistral => {
            let client = rig_client!(mistral, provider, settings);
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::Groq => {
            let client = rig_client!(groq, provider, settings);
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::DeepSeek => {
            let client = rig_client!(deepseek, provider, settings);
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::Perplexity => {
            let client = rig_client!(perplexity, provider, settings);
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::Xai => {
            let client = rig_client!(xai, provider, settings);
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::Ollama => {
            let base_url = settings
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_OLLAMA_BASE_URL);
            let client = ollama::Client::<reqwest::Client>::builder()
                .api_key(Nothing)
                .base_url(base_url)
                .http_client(settings.http_client)
                .build()
                .map_err(|e| Error::provider(provider, e))?;
            Arc::new(RigChat::new(provider, client.completion_model(model)))
        }
        ChatProvider::GigaChat => {
            return Err(Error::config("gigachat is served by its own client"));
        }
    };

    Ok(backend)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::chat::{ANTHROPIC_API_KEY, GIGACHAT_CREDENTIALS};
    use crate::embedding::OPENAI_API_KEY;
    use crate::proxy::{PROXY_LLM_API_BASE_URL, PROXY_LLM_API_KEY, PROXY_URL};

    fn openai_env() -> Environment {
        Environment::new().with_var(OPENAI_API_KEY, "sk-test")
    }

    fn params(value: Value) -> ChatParams {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_xai_always_gets_transport_and_zero_temperature() {
        let env = Environment::new()
            .with_var(XAI_API_KEY, "xai-test")
            .with_var(PROXY_URL, "http://proxy.local:3128");
        let chat = load_chat_model(
            "xai/grok-1",
            Some(params(json!({"temperature": 0.9}))),
            &env,
        )
        .unwrap();
        assert_eq!(chat.provider(), ChatProvider::Xai);
        assert_eq!(chat.model_name(), "grok-1");
        assert_eq!(chat.temperature(), Some(0.0));
        assert_eq!(chat.transport(), Transport::Proxied);

        let env = Environment::new().with_var(XAI_API_KEY, "xai-test");
        let chat = load_chat_model("xai/grok-1", None, &env).unwrap();
        assert_eq!(chat.temperature(), Some(0.0));
        assert_eq!(chat.transport(), Transport::Default);
    }

    #[test]
    fn test_generic_defaults_to_zero_temperature() {
        let chat = load_chat_model("openai/gpt-4o", None, &openai_env()).unwrap();
        assert_eq!(chat.provider(), ChatProvider::OpenAi);
        assert_eq!(chat.params(), &params(json!({"temperature": 0})));
        assert_eq!(chat.transport(), Transport::Default);
        assert_eq!(chat.base_url(), None);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let overrides = params(json!({"max_tokens": 256}));
        let chat = load_chat_model("openai/gpt-4o", Some(overrides.clone()), &openai_env()).unwrap();
        assert_eq!(chat.params(), &overrides);
        assert_eq!(chat.temperature(), None);

        let chat = load_chat_model("openai/gpt-4o", Some(ChatParams::new()), &openai_env()).unwrap();
        assert_eq!(chat.temperature(), Some(0.0));
    }

    #[test]
    fn test_gateway_pair_replaces_provider_key() {
        let env = Environment::new()
            .with_var(PROXY_LLM_API_BASE_URL, "https://gw.local/v1")
            .with_var(PROXY_LLM_API_KEY, "gw-key");
        let chat = load_chat_model("anthropic/claude-3-5-haiku-latest", None, &env).unwrap();
        assert_eq!(chat.base_url(), Some("https://gw.local/v1"));

        let half = Environment::new().with_var(PROXY_LLM_API_BASE_URL, "https://gw.local/v1");
        let err = load_chat_model("anthropic/claude-3-5-haiku-latest", None, &half).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(ANTHROPIC_API_KEY));
    }

    #[test]
    fn test_ollama_reads_base_url() {
        let env = Environment::new().with_var(OLLAMA_BASE_URL, "http://gpu-box:11434");
        let chat = load_chat_model("ollama/llama3", None, &env).unwrap();
        assert_eq!(chat.base_url(), Some("http://gpu-box:11434"));

        let chat = load_chat_model("ollama/llama3", None, &Environment::new()).unwrap();
        assert_eq!(chat.base_url(), Some(DEFAULT_OLLAMA_BASE_URL));
    }

    #[tokio::test]
    async fn test_malformed_proxy_is_ignored() {
        let env = openai_env().with_var(PROXY_URL, "localhost:3128");
        let chat = load_chat_model("openai/gpt-4o", None, &env).unwrap();
        assert_eq!(chat.transport(), Transport::Default);

        let env = openai_env().with_var(PROXY_URL, "http://proxy.local:3128");
        let chat = load_chat_model("openai/gpt-4o", None, &env).unwrap();
        assert_eq!(chat.transport(), Transport::Proxied);
    }

    #[test]
    fn test_bare_model_name_is_inferred() {
        let chat = load_chat_model("gpt-4o-mini", None, &openai_env()).unwrap();
        assert_eq!(chat.provider(), ChatProvider::OpenAi);
        assert_eq!(chat.model_name(), "gpt-4o-mini");

        let err = load_chat_model("llama3", None, &openai_env()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = load_chat_model("bedrock/titan", None, &Environment::new()).unwrap_err();
        assert!(err.is_configuration());
        let message = err.to_string();
        assert!(message.contains("unknown chat provider `bedrock`"));
        assert!(message.contains("gigachat"));
    }

    #[test]
    fn test_gigachat_uses_dedicated_client() {
        let err = load_chat_model("gigachat/GigaChat-Pro", None, &Environment::new()).unwrap_err();
        assert!(err.to_string().contains(GIGACHAT_CREDENTIALS));

        let env = Environment::new().with_var(GIGACHAT_CREDENTIALS, "Y2xpZW50OnNlY3JldA==");
        let chat = load_chat_model(
            "gigachat/GigaChat-Pro",
            Some(params(json!({"temperature": 0.7}))),
            &env,
        )
        .unwrap();
        assert_eq!(chat.provider(), ChatProvider::GigaChat);
        assert_eq!(chat.model_name(), "GigaChat-Pro");
        assert_eq!(chat.temperature(), Some(0.0));
    }

    #[test]
    fn test_inferred_xai_keeps_overrides() {
        let env = Environment::new().with_var(XAI_API_KEY, "xai-test");
        let chat = load_chat_model(
            "grok-2",
            Some(params(json!({"temperature": 0.9}))),
            &env,
        )
        .unwrap();
        assert_eq!(chat.provider(), ChatProvider::Xai);
        assert_eq!(chat.model_name(), "grok-2");
        assert_eq!(chat.temperature(), Some(0.9));
    }
}
