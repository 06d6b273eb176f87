//! Audit outcomes and report cards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::call::CallId;
use crate::verdict::CallTypeVerdict;

/// The six axes an audit scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Compliance,
    Communication,
    Empathy,
    Resolution,
    Accuracy,
    Tone,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Compliance,
        Dimension::Communication,
        Dimension::Empathy,
        Dimension::Resolution,
        Dimension::Accuracy,
        Dimension::Tone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Compliance => "compliance",
            Dimension::Communication => "communication",
            Dimension::Empathy => "empathy",
            Dimension::Resolution => "resolution",
            Dimension::Accuracy => "accuracy",
            Dimension::Tone => "tone",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dimension scores, each 0-100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub compliance: u8,
    pub communication: u8,
    pub empathy: u8,
    pub resolution: u8,
    pub accuracy: u8,
    pub tone: u8,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Compliance => self.compliance,
            Dimension::Communication => self.communication,
            Dimension::Empathy => self.empathy,
            Dimension::Resolution => self.resolution,
            Dimension::Accuracy => self.accuracy,
            Dimension::Tone => self.tone,
        }
    }

    pub fn set(&mut self, dimension: Dimension, score: u8) {
        match dimension {
            Dimension::Compliance => self.compliance = score,
            Dimension::Communication => self.communication = score,
            Dimension::Empathy => self.empathy = score,
            Dimension::Resolution => self.resolution = score,
            Dimension::Accuracy => self.accuracy = score,
            Dimension::Tone => self.tone = score,
        }
    }
}

/// Verdict on a single evaluated criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionVerdict {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "PARTIAL")]
    Partial,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl CriterionVerdict {
    /// Parse a verdict label from a model response; anything unrecognized
    /// is treated as not applicable rather than discarded.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "PASS" => CriterionVerdict::Pass,
            "PARTIAL" => CriterionVerdict::Partial,
            "FAIL" => CriterionVerdict::Fail,
            _ => CriterionVerdict::NotApplicable,
        }
    }
}

/// Result for one evaluated criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionResult {
    pub id: String,
    pub verdict: CriterionVerdict,
    /// 0-100
    pub score: u8,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Which backend produced an audit, and how long it took end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}

/// The structured evaluation produced by one audit attempt.
///
/// Created once per successful attempt and never mutated; a later attempt
/// supersedes it with a new outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub verdict: CallTypeVerdict,
    pub scorable: bool,
    /// Weighted aggregate across dimensions, 0-100
    pub overall_score: u8,
    pub scores: DimensionScores,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
    pub criteria_results: Vec<CriterionResult>,
    pub scoring_notes: String,
    pub provenance: Provenance,
}

/// Persisted form of an [`AuditOutcome`], keyed 1:1 to a call.
///
/// Its existence is the idempotency marker: a call with a report card is
/// never audited again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCard {
    pub id: Uuid,
    pub call_id: CallId,
    pub created_at: DateTime<Utc>,
    pub outcome: AuditOutcome,
}

impl ReportCard {
    pub fn new(call_id: CallId, outcome: AuditOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            call_id,
            created_at: Utc::now(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criterion_verdict_labels() {
        assert_eq!(CriterionVerdict::from_label("pass"), CriterionVerdict::Pass);
        assert_eq!(CriterionVerdict::from_label("PARTIAL"), CriterionVerdict::Partial);
        assert_eq!(CriterionVerdict::from_label("Fail"), CriterionVerdict::Fail);
        assert_eq!(CriterionVerdict::from_label("N/A"), CriterionVerdict::NotApplicable);
        assert_eq!(CriterionVerdict::from_label("??"), CriterionVerdict::NotApplicable);
    }

    #[test]
    fn test_criterion_verdict_serialization() {
        let json = serde_json::to_string(&CriterionVerdict::NotApplicable).unwrap();
        assert_eq!(json, "\"N/A\"");
        let json = serde_json::to_string(&CriterionVerdict::Pass).unwrap();
        assert_eq!(json, "\"PASS\"");
    }

    #[test]
    fn test_dimension_scores_accessors() {
        let mut scores = DimensionScores::default();
        for d in Dimension::ALL {
            assert_eq!(scores.get(d), 0);
        }
        scores.set(Dimension::Empathy, 84);
        assert_eq!(scores.get(Dimension::Empathy), 84);
        assert_eq!(scores.empathy, 84);
    }
}
