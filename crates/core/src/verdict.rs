//! Call-type classification types

use serde::{Deserialize, Serialize};

/// Call types the classifier can detect.
///
/// Each type carries its own scoring policy; five of them (voicemail,
/// voicemail_received, hangup, wrong_number, no_answer) are never scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    /// Full conversation with customer engagement
    LiveCall,
    /// Agent left a voicemail message
    Voicemail,
    /// Customer voicemail received (agent listening)
    VoicemailReceived,
    /// Customer hung up immediately
    Hangup,
    /// Wrong number or disconnected number
    WrongNumber,
    /// No answer, phone just rang
    NoAnswer,
    /// Call was transferred to another department/person
    Transfer,
    /// A callback was scheduled for later
    CallbackScheduled,
    /// Call focused on taking/discussing payment
    PaymentCall,
    /// Retention/save attempt
    RetentionCall,
    /// Inbound customer inquiry
    InboundInquiry,
    /// Outbound collection call
    OutboundCollection,
    /// Could not determine
    Unknown,
}

impl CallType {
    /// Every call type, in classification-prompt order.
    pub const ALL: [CallType; 13] = [
        CallType::LiveCall,
        CallType::Voicemail,
        CallType::VoicemailReceived,
        CallType::Hangup,
        CallType::WrongNumber,
        CallType::NoAnswer,
        CallType::Transfer,
        CallType::CallbackScheduled,
        CallType::PaymentCall,
        CallType::RetentionCall,
        CallType::InboundInquiry,
        CallType::OutboundCollection,
        CallType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::LiveCall => "live_call",
            CallType::Voicemail => "voicemail",
            CallType::VoicemailReceived => "voicemail_received",
            CallType::Hangup => "hangup",
            CallType::WrongNumber => "wrong_number",
            CallType::NoAnswer => "no_answer",
            CallType::Transfer => "transfer",
            CallType::CallbackScheduled => "callback_scheduled",
            CallType::PaymentCall => "payment_call",
            CallType::RetentionCall => "retention_call",
            CallType::InboundInquiry => "inbound_inquiry",
            CallType::OutboundCollection => "outbound_collection",
            CallType::Unknown => "unknown",
        }
    }

    /// Parse a label coming back from a model response.
    ///
    /// Unrecognized labels map to `Unknown` rather than failing, since the
    /// classifier must always produce a verdict.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "live_call" => CallType::LiveCall,
            "voicemail" => CallType::Voicemail,
            "voicemail_received" => CallType::VoicemailReceived,
            "hangup" => CallType::Hangup,
            "wrong_number" => CallType::WrongNumber,
            "no_answer" => CallType::NoAnswer,
            "transfer" => CallType::Transfer,
            "callback_scheduled" => CallType::CallbackScheduled,
            "payment_call" => CallType::PaymentCall,
            "retention_call" => CallType::RetentionCall,
            "inbound_inquiry" => CallType::InboundInquiry,
            "outbound_collection" => CallType::OutboundCollection,
            _ => CallType::Unknown,
        }
    }

    /// One-line definition used in the classification prompt.
    pub fn definition(&self) -> &'static str {
        match self {
            CallType::LiveCall => "Full two-way conversation with customer engagement",
            CallType::Voicemail => "Agent left a voicemail message",
            CallType::VoicemailReceived => "Customer left a voicemail (agent listening)",
            CallType::Hangup => "Customer hung up immediately or within seconds",
            CallType::WrongNumber => "Wrong number or disconnected number",
            CallType::NoAnswer => "No answer, phone just rang",
            CallType::Transfer => "Call was transferred to another department/person",
            CallType::CallbackScheduled => "A callback was scheduled for later",
            CallType::PaymentCall => "Call focused on taking/discussing payment",
            CallType::RetentionCall => "Call focused on retaining/saving the customer",
            CallType::InboundInquiry => "Customer called with a question/inquiry",
            CallType::OutboundCollection => "Outbound call for debt collection",
            CallType::Unknown => "Could not determine",
        }
    }
}

impl std::fmt::Display for CallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse duration bucket used by the classifier and prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    VeryShort,
    Short,
    Medium,
    Long,
}

impl DurationBucket {
    /// Fixed thresholds: <15s very_short, <60s short, <300s medium, else long.
    pub fn from_seconds(seconds: u32) -> Self {
        match seconds {
            0..=14 => DurationBucket::VeryShort,
            15..=59 => DurationBucket::Short,
            60..=299 => DurationBucket::Medium,
            _ => DurationBucket::Long,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationBucket::VeryShort => "very_short",
            DurationBucket::Short => "short",
            DurationBucket::Medium => "medium",
            DurationBucket::Long => "long",
        }
    }
}

impl std::fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of call-type classification.
///
/// Immutable once produced; the pipeline recomputes it on every audit
/// attempt instead of caching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTypeVerdict {
    pub call_type: CallType,
    /// Classifier confidence, 0-100
    pub confidence: u8,
    /// Textual indicators that led to the verdict
    pub indicators: Vec<String>,
    pub duration_bucket: DurationBucket,
    pub two_way_conversation: bool,
    pub customer_engaged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_buckets() {
        assert_eq!(DurationBucket::from_seconds(0), DurationBucket::VeryShort);
        assert_eq!(DurationBucket::from_seconds(14), DurationBucket::VeryShort);
        assert_eq!(DurationBucket::from_seconds(15), DurationBucket::Short);
        assert_eq!(DurationBucket::from_seconds(59), DurationBucket::Short);
        assert_eq!(DurationBucket::from_seconds(60), DurationBucket::Medium);
        assert_eq!(DurationBucket::from_seconds(299), DurationBucket::Medium);
        assert_eq!(DurationBucket::from_seconds(300), DurationBucket::Long);
    }

    #[test]
    fn test_label_round_trip() {
        for ct in CallType::ALL {
            assert_eq!(CallType::from_label(ct.as_str()), ct);
        }
    }

    #[test]
    fn test_unrecognized_label_is_unknown() {
        assert_eq!(CallType::from_label("robo_dial"), CallType::Unknown);
        assert_eq!(CallType::from_label(""), CallType::Unknown);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&CallType::CallbackScheduled).unwrap();
        assert_eq!(json, "\"callback_scheduled\"");
    }
}
