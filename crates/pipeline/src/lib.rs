//! Batch orchestration
//!
//! Sweeps the call store for backlog work and drives the auditor over it
//! sequentially, with sleep-based pacing as the only defense against
//! backend-side rate limiting. One call's failure never aborts a sweep.

pub mod orchestrator;

pub use orchestrator::{
    BatchFailure, BatchOptions, BatchOrchestrator, BatchSummary, ProgressFn, ProgressUpdate,
    TriggerResult,
};

use thiserror::Error;

use call_audit_auditor::AuditError;
use call_audit_core::CallId;
use call_audit_llm::LlmError;
use call_audit_store::StoreError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Backend construction failed, e.g. a missing API key. Surfaced
    /// per-call, never at startup.
    #[error(transparent)]
    Backend(#[from] LlmError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("call {0} has no transcript to audit")]
    MissingTranscript(CallId),
}
