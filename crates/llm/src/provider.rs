//! Provider descriptors

use std::time::Duration;

/// Supported provider families.
///
/// `OpenAi`, `LmStudio`, `Ollama` and `Azure` all speak the chat-completions
/// shape with minor auth differences; `Anthropic` uses the same shape with
/// its own headers and response path; `Gemini` uses the generate-content
/// shape and is handled by a separate backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    LmStudio,
    Ollama,
    Azure,
    Gemini,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" | "gpt" => Some(ProviderKind::OpenAi),
            "anthropic" | "claude" => Some(ProviderKind::Anthropic),
            "lmstudio" => Some(ProviderKind::LmStudio),
            "ollama" | "local" => Some(ProviderKind::Ollama),
            "azure" | "azure-openai" => Some(ProviderKind::Azure),
            "gemini" | "google" => Some(ProviderKind::Gemini),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::LmStudio => "lmstudio",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Azure => "azure",
            ProviderKind::Gemini => "gemini",
        }
    }
}

/// Default hard request timeout, distinct from any retry policy.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Everything needed to reach one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Full endpoint for chat-style providers; base generate-content URL
    /// (without the `?key=` query) for Gemini.
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ProviderConfig {
    fn base(kind: ProviderKind, endpoint: String, model: String) -> Self {
        Self {
            kind,
            endpoint,
            model,
            api_key: None,
            max_tokens: 4000,
            temperature: 0.3,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// OpenAI hosted API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let mut config = Self::base(
            ProviderKind::OpenAi,
            "https://api.openai.com/v1/chat/completions".to_string(),
            model.into(),
        );
        config.api_key = Some(api_key.into());
        config
    }

    /// Anthropic hosted API.
    pub fn anthropic(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let mut config = Self::base(
            ProviderKind::Anthropic,
            "https://api.anthropic.com/v1/messages".to_string(),
            model.into(),
        );
        config.api_key = Some(api_key.into());
        config
    }

    /// Local LM Studio server with its stock port.
    pub fn lmstudio() -> Self {
        Self::base(
            ProviderKind::LmStudio,
            "http://localhost:1234/v1/chat/completions".to_string(),
            "local-model".to_string(),
        )
    }

    /// Ollama server exposing the OpenAI-compatible route.
    pub fn ollama(host: impl Into<String>, model: impl Into<String>) -> Self {
        let host = host.into();
        Self::base(
            ProviderKind::Ollama,
            format!("{}/v1/chat/completions", host.trim_end_matches('/')),
            model.into(),
        )
    }

    /// Google AI Studio / Gemini generate-content API.
    ///
    /// The legacy `-latest` model suffix is stripped; the v1beta API no
    /// longer uses it.
    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into().replace("-latest", "");
        let mut config = Self::base(
            ProviderKind::Gemini,
            format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                model
            ),
            model,
        );
        config.api_key = Some(api_key.into());
        config
    }
}
