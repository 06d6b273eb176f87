//! The externally-managed AI settings record
//!
//! Provider selection lives in a single settings record owned by an external
//! admin surface. A missing required field (API key, host) is a per-call
//! configuration error at audit time, never a startup failure.

use serde::{Deserialize, Serialize};

/// AI provider settings as stored externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    /// Whether AI auditing is enabled at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Provider name: "gemini", "openai", "anthropic", "ollama", "lmstudio"
    pub provider: String,
    /// Endpoint host for self-hosted providers (Ollama, LM Studio)
    #[serde(default)]
    pub host: Option<String>,
    /// Model id; provider default applies when absent
    #[serde(default)]
    pub model: Option<String>,
    /// API key for hosted providers
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "lmstudio".to_string(),
            host: None,
            model: None,
            api_key: None,
        }
    }
}
