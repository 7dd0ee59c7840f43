//! Shared client settings for provider constructors.

use ragkit_core::Environment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::proxy::{LlmGateway, ProxyConfig};

/// How a client reaches its provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Direct connection with a default HTTP client.
    #[default]
    Default,
    /// Through the proxy configured in `PROXY_URL`.
    Proxied,
}

/// Splits a `provider/model` string on the first `/`.
///
/// A name without a separator yields an empty provider.
pub fn split_model_name(fully_specified_name: &str) -> (&str, &str) {
    fully_specified_name
        .split_once('/')
        .unwrap_or(("", fully_specified_name))
}

/// Resolved connection settings for one provider client.
#[derive(Clone)]
pub(crate) struct ClientSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub http_client: reqwest::Client,
    pub transport: Transport,
}

impl ClientSettings {
    /// Starts from a plain HTTP client.
    pub fn direct() -> Self {
        Self {
            api_key: None,
            base_url: None,
            http_client: reqwest::Client::new(),
            transport: Transport::Default,
        }
    }

    /// Uses the proxy from `PROXY_URL` when it is usable.
    pub fn with_env_proxy(mut self, env: &Environment) -> Result<Self> {
        if let Some(proxy) = ProxyConfig::from_env(env) {
            self.http_client = proxy.async_client()?;
            self.transport = Transport::Proxied;
        }
        Ok(self)
    }

    /// Reads the API key from `var`, unless one is already set.
    pub fn with_required_key(mut self, env: &Environment, var: &str) -> Result<Self> {
        if self.api_key.is_none() {
            let key = env
                .get(var)
                .ok_or_else(|| Error::config(format!("missing environment variable `{var}`")))?;
            self.api_key = Some(key.to_string());
        }
        Ok(self)
    }

    /// Applies the gateway override pair when both halves are set.
    pub fn with_gateway(mut self, env: &Environment) -> Self {
        if let Some(gateway) = LlmGateway::from_env(env) {
            self.base_url = Some(gateway.base_url);
            self.api_key = Some(gateway.api_key);
        }
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Returns the API key, or an empty string for keyless providers.
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
