//! Call records and lifecycle status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::verdict::CallType;

/// Opaque call identifier
pub type CallId = Uuid;

/// Lifecycle status of a stored call.
///
/// The audit pipeline only ever moves calls between `Transcribed`,
/// `Audited` and `AuditFailed`; ingestion owns the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Recording landed, no transcript yet
    Ingested,
    /// Transcript available, awaiting audit
    Transcribed,
    /// Audit completed and a report card exists
    Audited,
    /// Last audit attempt failed; eligible for retry
    AuditFailed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Ingested => "ingested",
            CallStatus::Transcribed => "transcribed",
            CallStatus::Audited => "audited",
            CallStatus::AuditFailed => "audit_failed",
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded customer-service call as the pipeline sees it.
///
/// Ownership of everything except `status` and `call_type` lies with the
/// ingestion process; the audit pipeline treats the rest as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    pub id: CallId,
    /// Transcript text produced by the external transcription service.
    /// `None` (or empty) means the call is not eligible for audit.
    pub transcript: Option<String>,
    /// Call duration in seconds
    pub duration_seconds: u32,
    /// Campaign the call was dialed under, if known
    pub campaign: Option<String>,
    /// Dialer disposition code, if known
    pub disposition: Option<String>,
    /// Source file or system the recording came from
    pub source_file: Option<String>,
    pub status: CallStatus,
    /// Call type detected by the most recent audit, if any
    pub call_type: Option<CallType>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Call {
    /// Create a transcribed call ready for audit (primarily for tests/dev).
    pub fn transcribed(transcript: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Some(transcript.into()),
            duration_seconds,
            campaign: None,
            disposition: None,
            source_file: None,
            status: CallStatus::Transcribed,
            call_type: None,
            started_at: Some(Utc::now()),
        }
    }

    /// Whether a non-empty transcript is present.
    pub fn has_transcript(&self) -> bool {
        self.transcript.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&CallStatus::AuditFailed).unwrap();
        assert_eq!(json, "\"audit_failed\"");
        let parsed: CallStatus = serde_json::from_str("\"transcribed\"").unwrap();
        assert_eq!(parsed, CallStatus::Transcribed);
    }

    #[test]
    fn test_has_transcript() {
        let mut call = Call::transcribed("hello there", 30);
        assert!(call.has_transcript());

        call.transcript = Some("   ".to_string());
        assert!(!call.has_transcript());

        call.transcript = None;
        assert!(!call.has_transcript());
    }
}
