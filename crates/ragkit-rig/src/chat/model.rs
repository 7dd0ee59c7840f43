//! Chat model handle and rig-backed completion.

use std::sync::Arc;

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel as RigCompletionModel};
use rig::message::Message;
use rig::one_or_many::OneOrMany;
use serde_json::{Map, Value};

use super::{ChatMessage, ChatProvider, ChatResponse, ChatRole};
use crate::TRACING_TARGET_CHAT;
use crate::client::Transport;
use crate::error::{Error, Result};

/// Inference parameters passed through to the provider.
pub type ChatParams = Map<String, Value>;

/// Completion backend behind a [`ChatModel`].
#[async_trait]
pub(crate) trait ChatBackend: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], params: &ChatParams) -> Result<String>;
}

/// A constructed chat client.
///
/// This is a cheaply cloneable wrapper around an `Arc`; clones share the
/// underlying HTTP transport.
#[derive(Clone)]
pub struct ChatModel(Arc<ChatModelInner>);

struct ChatModelInner {
    provider: ChatProvider,
    model_name: String,
    params: ChatParams,
    base_url: Option<String>,
    transport: Transport,
    backend: Arc<dyn ChatBackend>,
}

impl ChatModel {
    pub(crate) fn new(
        provider: ChatProvider,
        model_name: impl Into<String>,
        params: ChatParams,
        base_url: Option<String>,
        transport: Transport,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self(Arc::new(ChatModelInner {
            provider,
            model_name: model_name.into(),
            params,
            base_url,
            transport,
            backend,
        }))
    }

    /// Returns the provider.
    pub fn provider(&self) -> ChatProvider {
        self.0.provider
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        &self.0.model_name
    }

    /// Returns the inference parameters sent with every request.
    pub fn params(&self) -> &ChatParams {
        &self.0.params
    }

    /// Returns the sampling temperature, if one is set.
    pub fn temperature(&self) -> Option<f64> {
        self.0.params.get("temperature").and_then(Value::as_f64)
    }

    /// Returns the base URL override, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.0.base_url.as_deref()
    }

    /// Returns how the client reaches its provider.
    pub fn transport(&self) -> Transport {
        self.0.transport
    }

    /// Sends the conversation and returns the model's reply.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when `messages` does not end with a
    /// user message, or a provider error when the call fails.
    pub async fn invoke(&self, messages: Vec<ChatMessage>) -> ragkit_core::Result<ChatResponse> {
        tracing::debug!(
            target: TRACING_TARGET_CHAT,
            provider = %self.0.provider,
            model = %self.0.model_name,
            messages = messages.len(),
            "Invoking chat model"
        );

        let content = self.0.backend.complete(&messages, &self.0.params).await?;
        Ok(ChatResponse::new(content))
    }
}

impl std::fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("provider", &self.0.provider)
            .field("model", &self.0.model_name)
            .field("params", &self.0.params)
            .field("base_url", &self.0.base_url)
            .field("transport", &self.0.transport)
            .finish()
    }
}

/// A conversation split into the shape rig requests take.
#[derive(Debug)]
pub(crate) struct PromptParts {
    pub preamble: Option<String>,
    pub history: Vec<Message>,
    pub prompt: String,
}

impl PromptParts {
    /// System messages become the preamble and the trailing user message
    /// becomes the prompt. Everything else is history.
    pub fn split(messages: &[ChatMessage]) -> Result<Self> {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect();
        let mut turns: Vec<&ChatMessage> = messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .collect();

        let prompt = match turns.pop() {
            Some(last) if last.role == ChatRole::User => last.content.clone(),
            Some(_) => {
                return Err(Error::invalid_request(
                    "conversation must end with a user message",
                ));
            }
            None => return Err(Error::invalid_request("conversation has no user message")),
        };

        let history = turns
            .into_iter()
            .map(|m| match m.role {
                ChatRole::Assistant => Message::assistant(m.content.as_str()),
                _ => Message::user(m.content.as_str()),
            })
            .collect();

        Ok(Self {
            preamble: (!system.is_empty()).then(|| system.join("\n\n")),
            history,
            prompt,
        })
    }
}

/// A rig completion model behind the [`ChatBackend`] seam.
pub(crate) struct RigChat<M> {
    provider: ChatProvider,
    model: M,
}

impl<M> RigChat<M> {
    pub fn new(provider: ChatProvider, model: M) -> Self {
        Self { provider, model }
    }
}

#[async_trait]
impl<M> ChatBackend for RigChat<M>
where
    M: RigCompletionModel + 'static,
{
    async fn complete(&self, messages: &[ChatMessage], params: &ChatParams) -> Result<String> {
        let parts = PromptParts::split(messages)?;

        let mut request = self
            .model
            .completion_request(parts.prompt.as_str())
            .messages(parts.history);
        if let Some(preamble) = parts.preamble {
            request = request.preamble(preamble);
        }
        if let Some(temperature) = params.get("temperature").and_then(Value::as_f64) {
            request = request.temperature(temperature);
        }
        if let Some(max_tokens) = params.get("max_tokens").and_then(Value::as_u64) {
            request = request.max_tokens(max_tokens);
        }

        let extra: Map<String, Value> = params
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "temperature" | "max_tokens"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !extra.is_empty() {
            request = request.additional_params(Value::Object(extra));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::provider(self.provider, e))?;
        Ok(extract_text_content(&response.choice))
    }
}

/// Extracts text content from assistant content choices.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Records what it was asked and answers with a canned reply.
    #[derive(Default)]
    struct EchoBackend {
        seen: Mutex<Vec<(Vec<ChatMessage>, ChatParams)>>,
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn complete(&self, messages: &[ChatMessage], params: &ChatParams) -> Result<String> {
            let parts = PromptParts::split(messages)?;
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), params.clone()));
            Ok(format!("echo: {}", parts.prompt))
        }
    }

    fn params(value: Value) -> ChatParams {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_split_collects_preamble_and_history() {
        let parts = PromptParts::split(&[
            ChatMessage::system("be brief"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::system("cite sources"),
            ChatMessage::user("what is rust?"),
        ])
        .unwrap();

        assert_eq!(parts.preamble.as_deref(), Some("be brief\n\ncite sources"));
        assert_eq!(parts.prompt, "what is rust?");
        assert_eq!(parts.history.len(), 2);
    }

    #[test]
    fn test_split_requires_trailing_user_message() {
        let err = PromptParts::split(&[ChatMessage::user("hi"), ChatMessage::assistant("hello")])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        let err = PromptParts::split(&[ChatMessage::system("be brief")]).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_invoke_passes_params() {
        let backend = Arc::new(EchoBackend::default());
        let model = ChatModel::new(
            ChatProvider::OpenAi,
            "gpt-4o",
            params(json!({"temperature": 0})),
            None,
            Transport::Default,
            backend.clone(),
        );

        let response = model
            .invoke(vec![ChatMessage::user("ping")])
            .await
            .unwrap();
        assert_eq!(response.content, "echo: ping");
        assert_eq!(model.temperature(), Some(0.0));

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1["temperature"], json!(0));
    }

    #[tokio::test]
    async fn test_invoke_rejects_empty_conversation() {
        let model = ChatModel::new(
            ChatProvider::Ollama,
            "llama3",
            ChatParams::new(),
            None,
            Transport::Default,
            Arc::new(EchoBackend::default()),
        );

        let err = model.invoke(Vec::new()).await.unwrap_err();
        assert_eq!(err.kind(), ragkit_core::ErrorKind::InvalidInput);
    }
}
