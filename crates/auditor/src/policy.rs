//! Call-type scoring policies
//!
//! Pure data: which call types are scorable at all, how each dimension is
//! weighted for a given type, and which criteria are mandatory or excluded.
//! The table is built once and injected into the auditor.

use std::collections::HashMap;

use call_audit_core::{CallType, Dimension};

/// Weight multipliers per dimension, each in 0..=2 with 1.0 as neutral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionWeights {
    pub compliance: f32,
    pub communication: f32,
    pub empathy: f32,
    pub resolution: f32,
    pub accuracy: f32,
    pub tone: f32,
}

impl DimensionWeights {
    pub const fn uniform() -> Self {
        Self {
            compliance: 1.0,
            communication: 1.0,
            empathy: 1.0,
            resolution: 1.0,
            accuracy: 1.0,
            tone: 1.0,
        }
    }

    pub const fn zero() -> Self {
        Self {
            compliance: 0.0,
            communication: 0.0,
            empathy: 0.0,
            resolution: 0.0,
            accuracy: 0.0,
            tone: 0.0,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f32 {
        match dimension {
            Dimension::Compliance => self.compliance,
            Dimension::Communication => self.communication,
            Dimension::Empathy => self.empathy,
            Dimension::Resolution => self.resolution,
            Dimension::Accuracy => self.accuracy,
            Dimension::Tone => self.tone,
        }
    }

    /// Sum across all six dimensions, the divisor of the weighted mean.
    pub fn total(&self) -> f32 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }
}

/// How one call type is scored.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    pub call_type: CallType,
    pub scorable: bool,
    pub weights: DimensionWeights,
    /// Criteria the evaluation must weigh heavily for this type
    pub mandatory_criteria: Vec<String>,
    /// Criteria removed from the evaluation entirely for this type
    pub excluded_criteria: Vec<String>,
    /// Human-readable explanation, surfaced as feedback on non-scorable calls
    pub rationale: String,
}

impl ScoringPolicy {
    fn scorable(
        call_type: CallType,
        weights: DimensionWeights,
        mandatory: &[&str],
        excluded: &[&str],
        rationale: &str,
    ) -> Self {
        Self {
            call_type,
            scorable: true,
            weights,
            mandatory_criteria: mandatory.iter().map(|s| s.to_string()).collect(),
            excluded_criteria: excluded.iter().map(|s| s.to_string()).collect(),
            rationale: rationale.to_string(),
        }
    }

    fn not_scorable(call_type: CallType, rationale: &str) -> Self {
        Self {
            call_type,
            scorable: false,
            weights: DimensionWeights::zero(),
            mandatory_criteria: Vec::new(),
            excluded_criteria: Vec::new(),
            rationale: rationale.to_string(),
        }
    }
}

/// The full call-type-to-policy table, exhaustive over [`CallType`].
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: HashMap<CallType, ScoringPolicy>,
    fallback: ScoringPolicy,
}

impl PolicyTable {
    /// The standard policy set.
    pub fn standard() -> Self {
        let mut policies = HashMap::with_capacity(CallType::ALL.len());
        for policy in standard_policies() {
            policies.insert(policy.call_type, policy);
        }
        Self {
            policies,
            fallback: unknown_policy(),
        }
    }

    /// Look up the policy for a call type. `Unknown` carries full
    /// unweighted scoring and doubles as the fallback, so the lookup is
    /// total.
    pub fn policy(&self, call_type: CallType) -> &ScoringPolicy {
        self.policies.get(&call_type).unwrap_or(&self.fallback)
    }
}

fn unknown_policy() -> ScoringPolicy {
    ScoringPolicy::scorable(
        CallType::Unknown,
        DimensionWeights::uniform(),
        &[],
        &[],
        "Call type undetermined. Full unweighted scoring applies as the safe default.",
    )
}

fn standard_policies() -> Vec<ScoringPolicy> {
    vec![
        ScoringPolicy::scorable(
            CallType::LiveCall,
            DimensionWeights::uniform(),
            &[],
            &[],
            "Full conversation, standard evaluation applies.",
        ),
        ScoringPolicy::scorable(
            CallType::Transfer,
            DimensionWeights {
                compliance: 0.8,
                communication: 1.0,
                empathy: 0.7,
                resolution: 0.5,
                accuracy: 0.8,
                tone: 1.0,
            },
            &["GREETING", "TRANSFER_EXPLANATION", "PROFESSIONAL_TONE"],
            &["FULL_RESOLUTION", "PAYMENT_ARRANGEMENT"],
            "Transferred call. Resolution belongs to the receiving party; the handoff itself is evaluated.",
        ),
        ScoringPolicy::scorable(
            CallType::CallbackScheduled,
            DimensionWeights {
                compliance: 0.9,
                communication: 1.0,
                empathy: 0.8,
                resolution: 0.6,
                accuracy: 1.0,
                tone: 1.0,
            },
            &["CALLBACK_CONFIRMATION", "CONTACT_INFO_VERIFICATION"],
            &["FULL_RESOLUTION"],
            "Callback scheduled. Full resolution is deferred by design; scheduling quality is evaluated.",
        ),
        ScoringPolicy::scorable(
            CallType::PaymentCall,
            DimensionWeights {
                compliance: 1.0,
                communication: 1.0,
                empathy: 0.8,
                resolution: 1.0,
                accuracy: 1.0,
                tone: 0.9,
            },
            &["PAYMENT_VERIFICATION", "COMPLIANCE_DISCLOSURE", "ACCURATE_AMOUNTS"],
            &[],
            "Payment call. Verification and amount accuracy matter most.",
        ),
        ScoringPolicy::scorable(
            CallType::RetentionCall,
            DimensionWeights {
                compliance: 1.0,
                communication: 1.0,
                empathy: 1.2,
                resolution: 1.2,
                accuracy: 1.0,
                tone: 1.0,
            },
            &["RETENTION_OFFER", "CUSTOMER_CONCERNS", "RESOLUTION_ATTEMPT"],
            &[],
            "Retention call. Empathy and resolution weigh above standard.",
        ),
        ScoringPolicy::scorable(
            CallType::InboundInquiry,
            DimensionWeights {
                compliance: 0.9,
                communication: 1.0,
                empathy: 1.0,
                resolution: 1.0,
                accuracy: 1.0,
                tone: 1.0,
            },
            &["GREETING", "INQUIRY_HANDLING", "ACCURATE_INFO"],
            &[],
            "Inbound inquiry. Helpfulness and accuracy of answers drive the evaluation.",
        ),
        ScoringPolicy::scorable(
            CallType::OutboundCollection,
            DimensionWeights {
                compliance: 1.0,
                communication: 1.0,
                empathy: 0.9,
                resolution: 1.0,
                accuracy: 1.0,
                tone: 1.0,
            },
            &["MINI_MIRANDA", "PAYMENT_DISCUSSION", "COMPLIANCE_DISCLOSURE"],
            &[],
            "Outbound collection call. Regulatory disclosures are non-negotiable.",
        ),
        unknown_policy(),
        ScoringPolicy::not_scorable(
            CallType::Voicemail,
            "Agent left a voicemail. No two-way conversation occurred, so quality dimensions do not apply.",
        ),
        ScoringPolicy::not_scorable(
            CallType::VoicemailReceived,
            "Customer voicemail was received. Nothing for the agent to be evaluated on.",
        ),
        ScoringPolicy::not_scorable(
            CallType::Hangup,
            "Customer hung up before a conversation developed. Too little content to evaluate.",
        ),
        ScoringPolicy::not_scorable(
            CallType::WrongNumber,
            "Wrong or disconnected number. Not a customer interaction.",
        ),
        ScoringPolicy::not_scorable(
            CallType::NoAnswer,
            "No answer. There was no conversation to evaluate.",
        ),
    ]
}
