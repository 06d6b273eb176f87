//! Backend construction from the external settings record
//!
//! Adding a provider means adding a `ProviderKind` variant and a config
//! constructor, never branching inside shared request logic.

use std::sync::Arc;

use call_audit_core::AiSettings;

use crate::backend::{ChatCompletionsBackend, InferenceBackend};
use crate::gemini::GenerateContentBackend;
use crate::provider::ProviderConfig;
use crate::LlmError;

/// Seam for injecting backends; production uses [`HttpBackendFactory`],
/// tests substitute scripted implementations.
pub trait BackendFactory: Send + Sync {
    fn backend_for(&self, settings: &AiSettings) -> Result<Arc<dyn InferenceBackend>, LlmError>;
}

/// Factory producing real HTTP backends.
#[derive(Debug, Default)]
pub struct HttpBackendFactory;

impl BackendFactory for HttpBackendFactory {
    fn backend_for(&self, settings: &AiSettings) -> Result<Arc<dyn InferenceBackend>, LlmError> {
        backend_from_settings(settings)
    }
}

/// Build a backend from the externally-managed settings record.
///
/// A missing required field (API key, host) is a configuration error the
/// caller surfaces per call — the pipeline never refuses to start over it.
pub fn backend_from_settings(
    settings: &AiSettings,
) -> Result<Arc<dyn InferenceBackend>, LlmError> {
    if !settings.enabled {
        return Err(LlmError::Configuration(
            "AI auditing is disabled in settings".to_string(),
        ));
    }

    let provider = settings.provider.to_lowercase();
    match provider.as_str() {
        "gemini" => {
            let api_key = require(settings.api_key.as_deref(), "Gemini API key")?;
            let model = settings.model.as_deref().unwrap_or("gemini-2.0-flash");
            let config = ProviderConfig::gemini(api_key, model);
            Ok(Arc::new(GenerateContentBackend::new(config)?))
        }
        "openai" => {
            let api_key = require(settings.api_key.as_deref(), "OpenAI API key")?;
            let model = settings.model.as_deref().unwrap_or("gpt-4o-mini");
            let config = ProviderConfig::openai(api_key, model);
            Ok(Arc::new(ChatCompletionsBackend::new(config)?))
        }
        "anthropic" => {
            let api_key = require(settings.api_key.as_deref(), "Anthropic API key")?;
            let model = settings.model.as_deref().unwrap_or("claude-3-5-haiku-20241022");
            let config = ProviderConfig::anthropic(api_key, model);
            Ok(Arc::new(ChatCompletionsBackend::new(config)?))
        }
        "ollama" => {
            let host = require(settings.host.as_deref(), "Ollama host")?;
            let model = settings.model.as_deref().unwrap_or("llama3.1:8b");
            let config = ProviderConfig::ollama(host, model);
            Ok(Arc::new(ChatCompletionsBackend::new(config)?))
        }
        "lmstudio" => Ok(Arc::new(ChatCompletionsBackend::new(
            ProviderConfig::lmstudio(),
        )?)),
        other => Err(LlmError::Configuration(format!(
            "unknown AI provider: {other}"
        ))),
    }
}

fn require<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, LlmError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LlmError::Configuration(format!("{what} not configured"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> AiSettings {
        AiSettings {
            enabled: true,
            provider: provider.to_string(),
            host: None,
            model: None,
            api_key: None,
        }
    }

    #[test]
    fn test_missing_gemini_key_is_per_call_config_error() {
        let err = backend_from_settings(&settings("gemini")).unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
    }

    #[test]
    fn test_missing_ollama_host_is_config_error() {
        let err = backend_from_settings(&settings("ollama")).unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
    }

    #[test]
    fn test_disabled_settings_refused() {
        let mut s = settings("lmstudio");
        s.enabled = false;
        assert!(matches!(
            backend_from_settings(&s),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_lmstudio_needs_no_credentials() {
        let backend = backend_from_settings(&settings("lmstudio")).unwrap();
        assert_eq!(backend.provider_name(), "lmstudio");
        assert_eq!(backend.model_name(), "local-model");
    }

    #[test]
    fn test_gemini_backend_from_full_settings() {
        let mut s = settings("gemini");
        s.api_key = Some("AIza-x".to_string());
        s.model = Some("gemini-2.5-flash".to_string());
        let backend = backend_from_settings(&s).unwrap();
        assert_eq!(backend.provider_name(), "gemini");
        assert_eq!(backend.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = backend_from_settings(&settings("tarot")).unwrap_err();
        assert!(err.to_string().contains("unknown AI provider"));
    }
}
