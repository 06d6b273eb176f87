//! Persistent call store
//!
//! The audit pipeline depends on a narrow contract: fetch calls by status
//! that still lack a report card, insert report cards, and update call
//! status. [`CallStore`] captures exactly that surface; [`MemoryStore`] is
//! the in-process implementation used by the server and tests.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use call_audit_core::{
    AiSettings, AnalyticsRecord, Call, CallId, CallStatus, CallType, KeywordEntry, ReportCard,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("call {0} not found")]
    NotFound(CallId),

    /// A report card already exists for this call. The uniqueness guarantee
    /// at this layer is what closes the read-then-write idempotency race
    /// between overlapping batch sweeps.
    #[error("report card already exists for call {0}")]
    Duplicate(CallId),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for call_audit_core::Error {
    fn from(err: StoreError) -> Self {
        call_audit_core::Error::Storage(err.to_string())
    }
}

/// Storage operations the audit pipeline needs.
#[async_trait]
pub trait CallStore: Send + Sync {
    /// Fetch a single call by id.
    async fn call(&self, id: CallId) -> Result<Call, StoreError>;

    /// Insert a new call record (ingestion surface, also used to seed tests).
    async fn insert_call(&self, call: Call) -> Result<(), StoreError>;

    /// Calls eligible for audit: status in `statuses`, non-empty transcript,
    /// and no existing report card, up to `limit`.
    async fn calls_awaiting_audit(
        &self,
        statuses: &[CallStatus],
        limit: usize,
    ) -> Result<Vec<Call>, StoreError>;

    /// How many calls are currently awaiting audit (no limit applied).
    async fn pending_audit_count(&self, statuses: &[CallStatus]) -> Result<usize, StoreError>;

    /// Whether a report card exists for the call.
    async fn has_report_card(&self, call_id: CallId) -> Result<bool, StoreError>;

    /// Fetch the report card for a call, if any.
    async fn report_card(&self, call_id: CallId) -> Result<Option<ReportCard>, StoreError>;

    /// Insert a report card. Fails with [`StoreError::Duplicate`] if the
    /// call already has one; one card per call is enforced here.
    async fn insert_report_card(&self, card: ReportCard) -> Result<(), StoreError>;

    /// Update a call's lifecycle status, optionally tagging the detected
    /// call type.
    async fn set_call_status(
        &self,
        id: CallId,
        status: CallStatus,
        call_type: Option<CallType>,
    ) -> Result<(), StoreError>;

    /// Store the analytics record for a call (last write wins).
    async fn insert_analytics(&self, record: AnalyticsRecord) -> Result<(), StoreError>;

    /// The externally-managed AI provider settings.
    async fn ai_settings(&self) -> Result<AiSettings, StoreError>;

    /// The active keyword lexicon for conversation analytics.
    async fn keyword_lexicon(&self) -> Result<Vec<KeywordEntry>, StoreError>;
}
