//! Generate-content backend (Gemini / Google AI Studio)
//!
//! Different wire shape from chat completions: a single prompt blob goes in
//! as `contents[].parts[].text`, the answer comes back in a nested
//! candidate/part structure, and the API key travels as a query parameter.
//! A `finishReason` of `SAFETY` is a terminal refusal, never retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::backend::InferenceBackend;
use crate::provider::{ProviderConfig, ProviderKind};
use crate::LlmError;

const SYSTEM_PREAMBLE: &str =
    "You are an expert call quality auditor. Always respond with valid JSON only.";

pub struct GenerateContentBackend {
    config: ProviderConfig,
    client: Client,
}

impl GenerateContentBackend {
    pub fn new(config: ProviderConfig) -> Result<Self, LlmError> {
        debug_assert!(config.kind == ProviderKind::Gemini);
        if config.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(LlmError::Configuration(
                "Gemini requires an API key".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn keyed_url(&self, base: &str) -> String {
        // Key is already validated non-empty in new()
        let key = self.config.api_key.as_deref().unwrap_or_default();
        format!("{base}?key={key}")
    }
}

#[async_trait]
impl InferenceBackend for GenerateContentBackend {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{SYSTEM_PREAMBLE}\n\n{prompt}"),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
                response_mime_type: "application/json",
            },
            safety_settings: SafetySetting::block_none(),
        };

        let response = self
            .client
            .post(self.keyed_url(&self.config.endpoint))
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

        let candidate = body
            .get("candidates")
            .and_then(|c| c.get(0))
            .ok_or_else(|| LlmError::InvalidResponse("no candidates in response".to_string()))?;

        if candidate.get("finishReason").and_then(|r| r.as_str()) == Some("SAFETY") {
            return Err(LlmError::SafetyBlocked);
        }

        let text = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        tracing::debug!(model = %self.config.model, chars = text.len(), "completion received");
        Ok(text.to_string())
    }

    async fn is_available(&self) -> bool {
        let url = self.keyed_url("https://generativelanguage.googleapis.com/v1beta/models");
        self.client
            .get(url)
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
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

impl SafetySetting {
    /// Call transcripts routinely trip default filters (collections language,
    /// angry customers), so all categories run unblocked.
    fn block_none() -> Vec<SafetySetting> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderConfig;

    #[test]
    fn test_missing_key_is_configuration_error() {
        let mut config = ProviderConfig::gemini("", "gemini-2.0-flash");
        config.api_key = None;
        assert!(matches!(
            GenerateContentBackend::new(config),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_key_travels_as_query_param() {
        let backend =
            GenerateContentBackend::new(ProviderConfig::gemini("AIza-test", "gemini-2.0-flash"))
                .unwrap();
        let url = backend.keyed_url(&backend.config.endpoint);
        assert!(url.ends_with("generateContent?key=AIza-test"));
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello".to_string() }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 4000,
                response_mime_type: "application/json",
            },
            safety_settings: SafetySetting::block_none(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"maxOutputTokens\":4000"));
        assert!(json.contains("BLOCK_NONE"));
    }
}
