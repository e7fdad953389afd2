//! Ollama `/api/generate`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, LlmClient, build_http_client, ensure_success, transport_error};
use crate::registry::{ModelSpec, Provider};
use crate::{Result, RouterError};

/// Client for a local or LAN Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Options>,
}

#[derive(Serialize)]
struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, model: &ModelSpec, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        tracing::debug!(model = model.remote_id, prompt_len = request.prompt.len(), "Ollama generate");

        let options = (request.temperature.is_some() || request.max_tokens.is_some()).then(|| Options {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        });
        let body = GenerateRequest {
            model: model.remote_id,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Provider::Ollama, &self.base_url, e))?;
        let response = ensure_success(Provider::Ollama, response).await?;

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| RouterError::InvalidResponse {
                    provider: Provider::Ollama,
                    message: e.without_url().to_string(),
                })?;
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn generate_sends_remote_id_without_streaming() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "model": "MichelRosselli/apriel-1.5-15b-thinker",
                "prompt": "draw a flowchart",
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"x","response":"done","done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&format!("{}/", server.url()), 5).unwrap();
        let spec = ModelRegistry::builtin().get("apriel-1.5-15b-thinker").unwrap();

        let text = client
            .complete(spec, &CompletionRequest::new("draw a flowchart"))
            .await
            .unwrap();

        assert_eq!(text, "done");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'phi4' not found"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url(), 5).unwrap();
        let spec = ModelRegistry::builtin().get("phi4").unwrap();

        let err = client
            .complete(spec, &CompletionRequest::new("hi"))
            .await
            .unwrap_err();

        match err {
            RouterError::Api { status, body, .. } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
