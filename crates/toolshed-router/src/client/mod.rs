//! HTTP clients for the model providers
//!
//! Every client sends one non-streaming completion request and returns the
//! reply text. [`ProviderClients`] picks the right one for a [`ModelSpec`].

mod anthropic;
mod gemini;
mod ollama;
mod openai;

use std::time::Duration;

use async_trait::async_trait;
use toolshed_core::RouterSettings;

use crate::registry::{ModelSpec, Provider};
use crate::{Result, RouterError};

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// A single prompt sent to a model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Something that can answer a [`CompletionRequest`]
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, model: &ModelSpec, request: &CompletionRequest) -> Result<String>;
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(RouterError::HttpClient)
}

/// Map a send error, calling out servers that are not running.
///
/// The request URL is stripped from the error; some providers take
/// credentials in the query string.
pub(crate) fn transport_error(provider: Provider, url: &str, e: reqwest::Error) -> RouterError {
    let e = e.without_url();
    tracing::error!(%provider, url, error = %e, "Model request failed");
    if e.is_connect() {
        RouterError::Unreachable {
            provider,
            url: url.to_string(),
        }
    } else {
        RouterError::Transport {
            provider,
            source: e,
        }
    }
}

/// Turn a non-2xx response into [`RouterError::Api`].
pub(crate) async fn ensure_success(
    provider: Provider,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::error!(%provider, status = status.as_u16(), body = %body, "Provider returned error status");
    Err(RouterError::Api {
        provider,
        status: status.as_u16(),
        body,
    })
}

/// One client per provider, built from settings
///
/// Commercial clients exist only when their API key is configured.
pub struct ProviderClients {
    ollama: OllamaClient,
    openai: Option<OpenAiClient>,
    anthropic: Option<AnthropicClient>,
    gemini: Option<GeminiClient>,
}

impl ProviderClients {
    pub fn from_settings(settings: &RouterSettings) -> Result<Self> {
        let timeout = settings.request_timeout_secs;
        let keys = &settings.keys;

        let openai = match &keys.openai {
            Some(key) => Some(OpenAiClient::new(&settings.openai_base_url, key, timeout)?),
            None => None,
        };
        let anthropic = match &keys.anthropic {
            Some(key) => Some(AnthropicClient::new(&settings.anthropic_base_url, key, timeout)?),
            None => None,
        };
        let gemini = match &keys.gemini {
            Some(key) => Some(GeminiClient::new(&settings.gemini_base_url, key, timeout)?),
            None => None,
        };

        Ok(Self {
            ollama: OllamaClient::new(&settings.ollama_base_url, timeout)?,
            openai,
            anthropic,
            gemini,
        })
    }

    /// Whether a call for `provider` could be attempted.
    pub fn is_available(&self, provider: Provider) -> bool {
        match provider {
            Provider::Ollama => true,
            Provider::OpenAi => self.openai.is_some(),
            Provider::Anthropic => self.anthropic.is_some(),
            Provider::Google => self.gemini.is_some(),
        }
    }

    fn missing(provider: Provider) -> RouterError {
        RouterError::MissingApiKey {
            provider,
            env_var: provider.api_key_env().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl LlmClient for ProviderClients {
    async fn complete(&self, model: &ModelSpec, request: &CompletionRequest) -> Result<String> {
        match model.provider {
            Provider::Ollama => self.ollama.complete(model, request).await,
            Provider::OpenAi => match &self.openai {
                Some(client) => client.complete(model, request).await,
                None => Err(Self::missing(Provider::OpenAi)),
            },
            Provider::Anthropic => match &self.anthropic {
                Some(client) => client.complete(model, request).await,
                None => Err(Self::missing(Provider::Anthropic)),
            },
            Provider::Google => match &self.gemini {
                Some(client) => client.complete(model, request).await,
                None => Err(Self::missing(Provider::Google)),
            },
        }
    }
}
