//! Inference backend adapter
//!
//! Normalizes heterogeneous model-serving APIs into one call/response
//! contract:
//! - Chat-completions wire shape (OpenAI, LM Studio, Ollama, Azure, Anthropic)
//! - Generate-content wire shape (Gemini) with explicit safety-block detection
//!
//! The adapter enforces a hard per-request timeout via the HTTP client.
//! Retry policy lives one layer up, in the auditor.

pub mod backend;
pub mod factory;
pub mod gemini;
pub mod provider;

pub use backend::{ChatCompletionsBackend, InferenceBackend};
pub use factory::{backend_from_settings, BackendFactory, HttpBackendFactory};
pub use gemini::GenerateContentBackend;
pub use provider::{ProviderConfig, ProviderKind};

use thiserror::Error;

/// Classified inference errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request timed out")]
    Timeout,

    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("response blocked by safety filters")]
    SafetyBlocked,

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    /// Whether a retry at the caller's discretion could plausibly succeed.
    ///
    /// Safety blocks, 4xx responses, malformed payloads and configuration
    /// problems are terminal; timeouts, network failures, empty responses
    /// and 5xx/429 responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Timeout | LlmError::Network(_) | LlmError::EmptyResponse => true,
            LlmError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for call_audit_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => call_audit_core::Error::Configuration(msg),
            other => call_audit_core::Error::Inference(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Timeout.is_transient());
        assert!(LlmError::Network("reset".into()).is_transient());
        assert!(LlmError::EmptyResponse.is_transient());
        assert!(LlmError::Http { status: 500, body: String::new() }.is_transient());
        assert!(LlmError::Http { status: 429, body: String::new() }.is_transient());

        assert!(!LlmError::Http { status: 401, body: String::new() }.is_transient());
        assert!(!LlmError::SafetyBlocked.is_transient());
        assert!(!LlmError::InvalidResponse("x".into()).is_transient());
        assert!(!LlmError::Configuration("no key".into()).is_transient());
    }
}
