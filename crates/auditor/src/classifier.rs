//! Call-type classification
//!
//! Heuristics run first and can answer without touching the backend; the
//! backend-assisted path always has a heuristic fallback, so classification
//! never fails.

use std::sync::Arc;

use tracing::{debug, warn};

use call_audit_core::{CallType, CallTypeVerdict, DurationBucket};
use call_audit_llm::InferenceBackend;

use crate::prompts::classification_prompt;
use crate::response::{self, extract_json};

/// Phrases that mark a transcript as an answering-machine recording.
const VOICEMAIL_PHRASES: [&str; 7] = [
    "leave a message",
    "after the beep",
    "voicemail",
    "please leave",
    "at the tone",
    "not available",
    "mailbox",
];

/// Below this duration, a short transcript is treated as an immediate hangup.
const HANGUP_MAX_SECS: u32 = 10;
const HANGUP_MAX_TRANSCRIPT_CHARS: usize = 200;
/// Voicemail recordings longer than this get the full classification path.
const VOICEMAIL_MAX_SECS: u32 = 120;

pub struct Classifier {
    backend: Arc<dyn InferenceBackend>,
}

impl Classifier {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// Classify a transcript. Always produces a verdict; backend and parse
    /// failures degrade to a heuristic fallback rather than surfacing.
    pub async fn classify(&self, transcript: &str, duration_secs: u32) -> CallTypeVerdict {
        let bucket = DurationBucket::from_seconds(duration_secs);

        if duration_secs < HANGUP_MAX_SECS
            && transcript.chars().count() < HANGUP_MAX_TRANSCRIPT_CHARS
        {
            debug!(duration_secs, "hangup fast path");
            return CallTypeVerdict {
                call_type: CallType::Hangup,
                confidence: 90,
                indicators: vec!["Very short call with minimal transcript".to_string()],
                duration_bucket: bucket,
                two_way_conversation: false,
                customer_engaged: false,
            };
        }

        let lower = transcript.to_lowercase();
        let voicemail_candidate = duration_secs < VOICEMAIL_MAX_SECS
            && VOICEMAIL_PHRASES.iter().any(|p| lower.contains(p));

        match self.backend_classify(transcript, duration_secs, bucket).await {
            Some(verdict) => verdict,
            None => self.fallback(voicemail_candidate, duration_secs, bucket),
        }
    }

    async fn backend_classify(
        &self,
        transcript: &str,
        duration_secs: u32,
        bucket: DurationBucket,
    ) -> Option<CallTypeVerdict> {
        let prompt = classification_prompt(transcript, duration_secs);
        let raw = match self.backend.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "classification backend failed, using fallback");
                return None;
            }
        };

        let parsed = match extract_json(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "classification response unparseable, using fallback");
                return None;
            }
        };
        if !parsed.is_object() {
            warn!("classification response is not an object, using fallback");
            return None;
        }

        let call_type = CallType::from_label(
            parsed.get("call_type").and_then(|v| v.as_str()).unwrap_or(""),
        );
        Some(CallTypeVerdict {
            call_type,
            confidence: response::score_field(&parsed, "confidence"),
            indicators: response::string_list(&parsed, "indicators"),
            duration_bucket: bucket,
            two_way_conversation: parsed
                .get("two_way_conversation")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            customer_engaged: parsed
                .get("customer_engaged")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        })
    }

    fn fallback(
        &self,
        voicemail_candidate: bool,
        duration_secs: u32,
        bucket: DurationBucket,
    ) -> CallTypeVerdict {
        let call_type = if voicemail_candidate {
            CallType::Voicemail
        } else if duration_secs > 60 {
            CallType::LiveCall
        } else {
            CallType::Unknown
        };
        CallTypeVerdict {
            call_type,
            confidence: 40,
            indicators: vec!["Fallback detection used".to_string()],
            duration_bucket: bucket,
            two_way_conversation: call_type == CallType::LiveCall,
            customer_engaged: false,
        }
    }
}
