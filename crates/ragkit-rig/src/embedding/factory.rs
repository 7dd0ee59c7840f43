//! Embedding client factory.

use std::str::FromStr;

use ragkit_core::Environment;
use rig::client::Nothing;
use rig::prelude::EmbeddingsClient;
use rig::providers::{cohere, ollama, openai};
use strum::IntoEnumIterator;

use super::provider::{EmbeddingProvider, EmbeddingService};
use super::{
    COHERE_API_KEY, DEFAULT_OLLAMA_BASE_URL, EmbeddingBackend, OLLAMA_BASE_URL, OPENAI_API_KEY,
};
use crate::TRACING_TARGET_EMBEDDING;
use crate::client::{ClientSettings, split_model_name};
use crate::error::{Error, Result};

type Constructor = fn(&str, ClientSettings) -> Result<EmbeddingService>;

/// Constructors keyed by backend.
const CONSTRUCTORS: &[(EmbeddingBackend, Constructor)] = &[
    (EmbeddingBackend::OpenAi, openai_service),
    (EmbeddingBackend::Cohere, cohere_service),
    (EmbeddingBackend::Ollama, ollama_service),
];

/// Builds an embedding client from a `provider/model` string.
///
/// Resolves credentials from `env`; no network I/O takes place.
///
/// # Errors
///
/// Returns a configuration error when the name has no provider prefix,
/// names an unsupported provider, or a required key variable is unset.
pub fn make_text_encoder(model: &str, env: &Environment) -> ragkit_core::Result<EmbeddingProvider> {
    build(model, env, false)
}

/// Builds an embedding client that honours the proxy settings.
///
/// Like [`make_text_encoder`], but routes traffic through `PROXY_URL` when it
/// is usable, and points OpenAI and Cohere clients at the gateway when both
/// `PROXY_LLM_API_BASE_URL` and `PROXY_LLM_API_KEY` are set.
pub fn make_proxied_text_encoder(
    model: &str,
    env: &Environment,
) -> ragkit_core::Result<EmbeddingProvider> {
    build(model, env, true)
}

fn build(model: &str, env: &Environment, proxied: bool) -> ragkit_core::Result<EmbeddingProvider> {
    let (provider, model_name) = split_model_name(model);
    if provider.is_empty() {
        return Err(Error::config(format!(
            "embedding model `{model}` must be of the form `provider/model`"
        ))
        .into());
    }

    let backend = EmbeddingBackend::from_str(provider).map_err(|_| {
        Error::unknown_provider("embedding", provider, EmbeddingBackend::iter())
    })?;

    let mut settings = ClientSettings::direct();
    if proxied {
        settings = settings.with_env_proxy(env)?;
    }
    let settings = resolve_settings(backend, settings, env, proxied)?;
    let transport = settings.transport;
    let base_url = settings.base_url.clone();

    let constructor = CONSTRUCTORS
        .iter()
        .find_map(|(candidate, constructor)| (*candidate == backend).then_some(*constructor))
        .ok_or_else(|| Error::unknown_provider("embedding", provider, EmbeddingBackend::iter()))?;

    let service = constructor(model_name, settings)?;
    let provider = EmbeddingProvider::new(service, transport, base_url);

    tracing::debug!(
        target: TRACING_TARGET_EMBEDDING,
        provider = %provider.provider_name(),
        model = %provider.model_name(),
        ndims = provider.ndims(),
        transport = ?transport,
        "Embedding client created"
    );

    Ok(provider)
}

fn resolve_settings(
    backend: EmbeddingBackend,
    settings: ClientSettings,
    env: &Environment,
    proxied: bool,
) -> Result<ClientSettings> {
    match backend {
        EmbeddingBackend::OpenAi | EmbeddingBackend::Cohere => {
            let settings = if proxied {
                settings.with_gateway(env)
            } else {
                settings
            };
            let key_var = match backend {
                EmbeddingBackend::Cohere => COHERE_API_KEY,
                _ => OPENAI_API_KEY,
            };
            settings.with_required_key(env, key_var)
        }
        EmbeddingBackend::Ollama => {
            Ok(settings.with_base_url(env.get_or(OLLAMA_BASE_URL, DEFAULT_OLLAMA_BASE_URL)))
        }
    }
}

fn openai_service(model_name: &str, settings: ClientSettings) -> Result<EmbeddingService> {
    let mut builder = openai::Client::<reqwest::Client>::builder().api_key(settings.api_key());
    if let Some(base_url) = settings.base_url.as_deref() {
        builder = builder.base_url(base_url);
    }
    let client = builder
        .http_client(settings.http_client)
        .build()
        .map_err(|e| Error::provider("openai", e))?;

    let ndims = EmbeddingBackend::OpenAi.dimensions(model_name);
    Ok(EmbeddingService::OpenAi {
        model: client.embedding_model_with_ndims(model_name, ndims),
        model_name: model_name.to_string(),
    })
}

fn cohere_service(model_name: &str, settings: ClientSettings) -> Result<EmbeddingService> {
    let mut builder = cohere::Client::<reqwest::Client>::builder().api_key(settings.api_key());
    if let Some(base_url) = settings.base_url.as_deref() {
        builder = builder.base_url(base_url);
    }
    let client = builder
        .http_client(settings.http_client)
        .build()
        .map_err(|e| Error::provider("cohere", e))?;

    let ndims = EmbeddingBackend::Cohere.dimensions(model_name);
    Ok(EmbeddingService::Cohere {
        query_model: client.embedding_model_with_ndims(model_name, "search_query", ndims),
        document_model: client.embedding_model_with_ndims(model_name, "search_document", ndims),
        model_name: model_name.to_string(),
    })
}

fn ollama_service(model_name: &str, settings: ClientSettings) -> Result<EmbeddingService> {
    let base_url = settings
        .base_url
        .as_deref()
        .unwrap_or(DEFAULT_OLLAMA_BASE_URL);

    let client = ollama::Client::<reqwest::Client>::builder()
        .api_key(Nothing)
        .base_url(base_url)
        .http_client(settings.http_client)
        .build()
        .map_err(|e| Error::provider("ollama", e))?;

    Ok(EmbeddingService::Ollama {
        client,
        model_name: model_name.to_string(),
        ndims: EmbeddingBackend::Ollama.dimensions(model_name),
    })
}

#[cfg(test)]
mod tests {
    use ragkit_core::TextEmbedder;

    use super::*;
    use crate::client::Transport;
    use crate::proxy::PROXY_URL;

    #[test]
    fn test_openai_requires_key() {
        let err = make_text_encoder("openai/text-embedding-3-small", &Environment::new())
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(OPENAI_API_KEY));
    }

    #[test]
    fn test_openai_builds() {
        let env = Environment::new().with_var(OPENAI_API_KEY, "sk-test");
        let embedder = make_text_encoder("openai/text-embedding-3-small", &env).unwrap();
        assert_eq!(embedder.backend(), EmbeddingBackend::OpenAi);
        assert_eq!(TextEmbedder::model_name(&embedder), "text-embedding-3-small");
        assert_eq!(TextEmbedder::ndims(&embedder), 1536);
        assert_eq!(embedder.transport(), Transport::Default);
    }

    #[test]
    fn test_cohere_builds() {
        let env = Environment::new().with_var(COHERE_API_KEY, "co-test");
        let embedder = make_text_encoder("cohere/embed-english-v3.0", &env).unwrap();
        assert_eq!(embedder.provider_name(), "cohere");
        assert_eq!(embedder.ndims(), 1024);
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let embedder = make_text_encoder("ollama/nomic-embed-text", &Environment::new()).unwrap();
        assert_eq!(embedder.backend(), EmbeddingBackend::Ollama);
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.ndims(), 768);
    }

    #[test]
    fn test_ollama_defaults_to_local_server() {
        let embedder = make_text_encoder("ollama/llama3", &Environment::new()).unwrap();
        assert_eq!(embedder.backend(), EmbeddingBackend::Ollama);
        assert_eq!(embedder.model_name(), "llama3");
        assert_eq!(embedder.base_url(), Some("http://localhost:11434"));

        let env = Environment::new().with_var(OLLAMA_BASE_URL, "http://gpu-box:11434");
        let embedder = make_text_encoder("ollama/llama3", &env).unwrap();
        assert_eq!(embedder.base_url(), Some("http://gpu-box:11434"));
    }

    #[test]
    fn test_unknown_x_is_rejected() {
        let err = make_text_encoder("unknown/x", &Environment::new()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("unknown embedding provider `unknown`"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = make_text_encoder("voyage/voyage-3", &Environment::new()).unwrap_err();
        assert!(err.is_configuration());
        let message = err.to_string();
        assert!(message.contains("unknown embedding provider `voyage`"));
        assert!(message.contains("openai, cohere, ollama"));
    }

    #[test]
    fn test_missing_prefix_is_rejected() {
        let err = make_text_encoder("text-embedding-3-small", &Environment::new()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_proxied_encoder_uses_proxy() {
        let env = Environment::new()
            .with_var(OPENAI_API_KEY, "sk-test")
            .with_var(PROXY_URL, "http://proxy.local:3128");

        let proxied = make_proxied_text_encoder("openai/text-embedding-3-small", &env).unwrap();
        assert_eq!(proxied.transport(), Transport::Proxied);

        let direct = make_text_encoder("openai/text-embedding-3-small", &env).unwrap();
        assert_eq!(direct.transport(), Transport::Default);
    }
}
