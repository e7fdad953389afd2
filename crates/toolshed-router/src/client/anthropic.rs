//! Anthropic messages API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, LlmClient, build_http_client, ensure_success, transport_error};
use crate::registry::{ModelSpec, Provider};
use crate::{Result, RouterError};

const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Clone)]
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: build_http_client(timeout_secs)?,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [Message<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, model: &ModelSpec, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: model.remote_id,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: request.system.as_deref(),
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Provider::Anthropic, &self.base_url, e))?;
        let response = ensure_success(Provider::Anthropic, response).await?;

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| RouterError::InvalidResponse {
                    provider: Provider::Anthropic,
                    message: e.without_url().to_string(),
                })?;

        let text: Vec<String> = parsed
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect();
        if text.is_empty() {
            return Err(RouterError::InvalidResponse {
                provider: Provider::Anthropic,
                message: "no text blocks in response".into(),
            });
        }
        Ok(text.join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn sends_version_header_and_joins_text_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(json!({
                "model": "claude-3-7-sonnet-20250219",
                "max_tokens": 4096,
                "system": "persona"
            })))
            .with_status(200)
            .with_body(
                r#"{"content":[{"type":"text","text":"part one, "},{"type":"tool_use","id":"t"},{"type":"text","text":"part two"}]}"#,
            )
            .create_async()
            .await;

        let client = AnthropicClient::new(&server.url(), "sk-ant", 5).unwrap();
        let spec = ModelRegistry::builtin().get("claude-sonnet-3.7").unwrap();
        let request = CompletionRequest::new("prove it").with_system("persona");

        let text = client.complete(spec, &request).await.unwrap();

        assert_eq!(text, "part one, part two");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_surfaces_as_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_body(r#"{"type":"error","error":{"type":"rate_limit_error"}}"#)
            .create_async()
            .await;

        let client = AnthropicClient::new(&server.url(), "sk-ant", 5).unwrap();
        let spec = ModelRegistry::builtin().get("claude-haiku-3.5").unwrap();

        let err = client
            .complete(spec, &CompletionRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Api { status: 429, .. }));
    }
}
