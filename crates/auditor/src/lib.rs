//! Adaptive call-quality auditing
//!
//! The flow through this crate:
//! 1. [`classifier`] produces a [`CallTypeVerdict`] (heuristics first, then a
//!    backend-assisted path with a heuristic fallback — never fails)
//! 2. [`policy`] maps the detected type to scorability and dimension weights
//! 3. [`auditor`] builds the evaluation prompt, drives the backend with
//!    bounded retry, validates the response and aggregates weighted scores
//! 4. [`analytics`] runs an independent keyword/sentiment scan
//!
//! [`CallTypeVerdict`]: call_audit_core::CallTypeVerdict

pub mod analytics;
pub mod auditor;
pub mod classifier;
pub mod policy;
pub mod prompts;
pub mod response;

pub use analytics::{analyze, default_lexicon};
pub use auditor::{AuditRequest, Auditor};
pub use classifier::Classifier;
pub use policy::{DimensionWeights, PolicyTable, ScoringPolicy};

use call_audit_llm::LlmError;
use thiserror::Error;

/// Errors an audit attempt can surface to the orchestrator.
///
/// Classification errors are absent by design: the classifier always falls
/// back to a heuristic verdict.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Backend call failed (timeout, HTTP failure, safety block, ...)
    #[error(transparent)]
    Backend(#[from] LlmError),

    /// The response parsed but did not satisfy the evaluation contract.
    /// Retrying will not fix a malformed contract, so these abort immediately.
    #[error("invalid evaluation response: {0}")]
    Validation(String),
}

impl AuditError {
    /// Only transient backend failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            AuditError::Backend(e) => e.is_transient(),
            AuditError::Validation(_) => false,
        }
    }
}

impl From<AuditError> for call_audit_core::Error {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Backend(e) => e.into(),
            AuditError::Validation(msg) => call_audit_core::Error::Validation(msg),
        }
    }
}
