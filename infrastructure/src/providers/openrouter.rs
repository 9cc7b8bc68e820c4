//! OpenRouter chat completions adapter
//!
//! Implements the [`LlmGateway`] port against the OpenRouter HTTP API.
//! One POST per invocation; the per-call timeout comes from the request,
//! not the client, so configuration changes apply without rebuilding the
//! adapter. Reasoning parameters are injected verbatim as a top-level
//! payload field named by the configured override.

use async_trait::async_trait;
use council_application::ports::llm_gateway::{
    CompletionRequest, GatewayError, LlmGateway,
};
use council_domain::Model;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Gateway that invokes models through OpenRouter
pub struct OpenRouterGateway {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl OpenRouterGateway {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Read the API key from `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            GatewayError::ConnectionError(format!("{} is not set", API_KEY_ENV))
        })?;
        Ok(Self::new(api_key))
    }

    /// Point the gateway at a different endpoint (proxies, tests)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn build_payload(model: &Model, request: &CompletionRequest) -> serde_json::Value {
        let mut payload = json!({
            "model": model.as_str(),
            "messages": request.messages,
        });
        if let Some(reasoning) = &request.reasoning {
            payload[reasoning.param_name.as_str()] = reasoning.value.clone();
        }
        payload
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmGateway for OpenRouterGateway {
    async fn complete(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<String, GatewayError> {
        let payload = Self::build_payload(model, &request);
        debug!("OpenRouter request for {}", model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else if e.is_connect() {
                    GatewayError::ConnectionError(e.to_string())
                } else {
                    GatewayError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::ModelNotAvailable(model.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                GatewayError::MalformedResponse("response has no message content".to_string())
            })
    }
}
