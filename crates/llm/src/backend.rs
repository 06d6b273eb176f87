//! Chat-completions backend
//!
//! One implementation covers every provider speaking the
//! `{model, messages, temperature, max_tokens}` request shape. Auth header
//! placement and the response text path differ per vendor:
//! - Anthropic: `x-api-key` + `anthropic-version` headers, text at
//!   `content[0].text`
//! - Everyone else: `Authorization: Bearer`, text at
//!   `choices[0].message.content`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::provider::{ProviderConfig, ProviderKind};
use crate::LlmError;

const SYSTEM_PROMPT: &str =
    "You are an expert call quality auditor. Always respond with valid JSON only.";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The single call/response contract every backend normalizes to.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Send one prompt, return the raw text response.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Probe whether the provider is reachable.
    async fn is_available(&self) -> bool;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

impl std::fmt::Debug for dyn InferenceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceBackend")
            .field("provider", &self.provider_name())
            .field("model", &self.model_name())
            .finish()
    }
}

/// Backend for chat-completions shaped providers.
pub struct ChatCompletionsBackend {
    config: ProviderConfig,
    client: Client,
}

impl ChatCompletionsBackend {
    /// Build a backend with the hard request timeout baked into the client.
    pub fn new(config: ProviderConfig) -> Result<Self, LlmError> {
        debug_assert!(config.kind != ProviderKind::Gemini);
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref key) = self.config.api_key {
            match self.config.kind {
                ProviderKind::Anthropic => {
                    if let Ok(val) = HeaderValue::from_str(key) {
                        headers.insert("x-api-key", val);
                    }
                    headers.insert(
                        "anthropic-version",
                        HeaderValue::from_static(ANTHROPIC_VERSION),
                    );
                }
                _ => {
                    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {key}")) {
                        headers.insert(AUTHORIZATION, val);
                    }
                }
            }
        }

        headers
    }

    fn extract_text(&self, body: &serde_json::Value) -> Option<String> {
        let text = match self.config.kind {
            ProviderKind::Anthropic => body
                .get("content")?
                .get(0)?
                .get("text")?
                .as_str()?,
            _ => body
                .get("choices")?
                .get(0)?
                .get("message")?
                .get("content")?
                .as_str()?,
        };
        Some(text.to_string())
    }
}

#[async_trait]
impl InferenceBackend for ChatCompletionsBackend {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(self.build_headers())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = self
            .extract_text(&body)
            .ok_or_else(|| LlmError::InvalidResponse("no text field in response".to_string()))?;

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        tracing::debug!(
            provider = self.config.kind.name(),
            model = %self.config.model,
            chars = text.len(),
            "completion received"
        );
        Ok(text)
    }

    async fn is_available(&self) -> bool {
        // Ollama exposes its model list at /api/tags; OpenAI-compatible
        // servers at /models next to /chat/completions.
        let probe = match self.config.kind {
            ProviderKind::Ollama => self
                .config
                .endpoint
                .replace("/v1/chat/completions", "/api/tags"),
            _ => self.config.endpoint.replace("/chat/completions", "/models"),
        };

        self.client
            .get(&probe)
            .headers(self.build_headers())
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn provider_name(&self) -> &str {
        self.config.kind.name()
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}
