//! Adaptive audit execution
//!
//! One invocation produces exactly one [`AuditOutcome`]. Non-scorable call
//! types short-circuit without touching the backend; scorable ones go
//! through a bounded retry loop where transient backend failures back off
//! exponentially and contract violations abort immediately.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use call_audit_core::{
    AuditOutcome, CallType, CallTypeVerdict, Criterion, Dimension, DimensionScores,
    DurationBucket, Provenance,
};
use call_audit_llm::InferenceBackend;

use crate::classifier::Classifier;
use crate::policy::{PolicyTable, ScoringPolicy};
use crate::prompts::audit_prompt;
use crate::response::{self, extract_json};
use crate::AuditError;

const MAX_ATTEMPTS: u32 = 3;

/// Context used when a call is identified as retention by classification
/// alone, with no caller-supplied detail.
const DETECTED_RETENTION_CONTEXT: &str =
    "The customer appears at risk of leaving; evaluate whether the agent uncovered \
     the reason and attempted to save the relationship.";

/// Everything the auditor needs to evaluate one call.
pub struct AuditRequest<'a> {
    pub transcript: &'a str,
    pub duration_secs: u32,
    pub criteria: &'a [Criterion],
    /// Skip classification and audit as this type (confidence 100)
    pub forced_call_type: Option<CallType>,
    /// Extra prompt context when the call is a retention interaction
    pub retention_context: Option<&'a str>,
}

pub struct Auditor {
    backend: Arc<dyn InferenceBackend>,
    policies: PolicyTable,
}

impl Auditor {
    pub fn new(backend: Arc<dyn InferenceBackend>, policies: PolicyTable) -> Self {
        Self { backend, policies }
    }

    /// Classify (or accept the forced type) and produce one audit outcome.
    pub async fn audit(&self, request: &AuditRequest<'_>) -> Result<AuditOutcome, AuditError> {
        let started = Instant::now();

        let verdict = match request.forced_call_type {
            Some(call_type) => CallTypeVerdict {
                call_type,
                confidence: 100,
                indicators: vec!["Manually specified".to_string()],
                duration_bucket: DurationBucket::from_seconds(request.duration_secs),
                two_way_conversation: true,
                customer_engaged: true,
            },
            None => {
                Classifier::new(self.backend.clone())
                    .classify(request.transcript, request.duration_secs)
                    .await
            }
        };
        debug!(
            call_type = %verdict.call_type,
            confidence = verdict.confidence,
            "call classified"
        );

        let policy = self.policies.policy(verdict.call_type);
        if !policy.scorable {
            info!(call_type = %verdict.call_type, "call type not scorable, skipping evaluation");
            return Ok(self.unscored_outcome(verdict, policy, started));
        }

        let criteria: Vec<Criterion> = request
            .criteria
            .iter()
            .filter(|c| !policy.excluded_criteria.contains(&c.id))
            .cloned()
            .collect();
        // Retention guidance applies when the caller flags the call OR the
        // detected type itself is retention.
        let retention_context = match request.retention_context {
            Some(context) => Some(context),
            None if verdict.call_type == CallType::RetentionCall => {
                Some(DETECTED_RETENTION_CONTEXT)
            }
            None => None,
        };
        let prompt = audit_prompt(
            request.transcript,
            request.duration_secs,
            &verdict,
            policy,
            &criteria,
            retention_context,
        );

        let parsed = self.complete_with_retry(&prompt).await?;
        Ok(self.build_outcome(verdict, policy, &parsed, started))
    }

    /// Drive the backend with up to [`MAX_ATTEMPTS`] attempts. Transient
    /// failures back off 2^attempt seconds; validation errors abort at once
    /// since retrying cannot fix a broken response contract.
    async fn complete_with_retry(&self, prompt: &str) -> Result<Value, AuditError> {
        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            let result = self.attempt(prompt).await;
            match result {
                Ok(parsed) => return Ok(parsed),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(attempt, error = %e, "audit attempt failed");
                    last_error = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        sleep(Duration::from_secs(1 << attempt)).await;
                    }
                }
            }
        }
        // last_error is always set when the loop exhausts
        Err(last_error.unwrap_or(AuditError::Validation("no attempts made".to_string())))
    }

    async fn attempt(&self, prompt: &str) -> Result<Value, AuditError> {
        let raw = self.backend.complete(prompt).await?;
        let parsed = extract_json(&raw)?;
        if !parsed.is_object() {
            return Err(AuditError::Validation(
                "evaluation response is not a JSON object".to_string(),
            ));
        }
        Ok(parsed)
    }

    fn unscored_outcome(
        &self,
        verdict: CallTypeVerdict,
        policy: &ScoringPolicy,
        started: Instant,
    ) -> AuditOutcome {
        let scoring_notes = format!(
            "This {} call type is not scorable. {}",
            verdict.call_type, policy.rationale
        );
        AuditOutcome {
            verdict,
            scorable: false,
            overall_score: 0,
            scores: DimensionScores::default(),
            feedback: policy.rationale.clone(),
            strengths: Vec::new(),
            improvements: Vec::new(),
            recommendations: Vec::new(),
            criteria_results: Vec::new(),
            scoring_notes,
            provenance: self.provenance(started),
        }
    }

    /// Clamp, weight and aggregate a parsed evaluation into the final
    /// outcome. List fields that are not arrays become empty lists.
    fn build_outcome(
        &self,
        verdict: CallTypeVerdict,
        policy: &ScoringPolicy,
        parsed: &Value,
        started: Instant,
    ) -> AuditOutcome {
        let raw_scores = parsed.get("scores").cloned().unwrap_or(Value::Null);

        let mut scores = DimensionScores::default();
        let mut weighted_sum = 0.0f64;
        for dimension in Dimension::ALL {
            let raw = response::score_field(&raw_scores, dimension.as_str());
            let weight = f64::from(policy.weights.get(dimension));
            let adjusted = response::clamp_score(f64::from(raw) * weight);
            scores.set(dimension, adjusted);
            weighted_sum += f64::from(adjusted) * weight;
        }
        let total_weight = f64::from(policy.weights.total());
        let overall_score = if total_weight > 0.0 {
            response::clamp_score(weighted_sum / total_weight)
        } else {
            0
        };

        let mut scoring_notes = response::string_field(parsed, "scoring_notes");
        if !scoring_notes.is_empty() {
            scoring_notes.push(' ');
        }
        scoring_notes.push_str(&format!(
            "Call Type: {} ({}% confidence)",
            verdict.call_type, verdict.confidence
        ));

        AuditOutcome {
            verdict,
            scorable: true,
            overall_score,
            scores,
            feedback: response::string_field(parsed, "feedback"),
            strengths: response::string_list(parsed, "strengths"),
            improvements: response::string_list(parsed, "improvements"),
            recommendations: response::string_list(parsed, "recommendations"),
            criteria_results: response::criteria_list(parsed, "criteria"),
            scoring_notes,
            provenance: self.provenance(started),
        }
    }

    fn provenance(&self, started: Instant) -> Provenance {
        Provenance {
            provider: self.backend.provider_name().to_string(),
            model: self.backend.model_name().to_string(),
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use call_audit_core::default_criteria;
    use call_audit_llm::LlmError;
    use parking_lot::Mutex;

    struct ScriptedBackend {
        responses: Mutex<Vec<Result<String, LlmError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            })
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            *self.calls.lock() += 1;
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                Err(LlmError::EmptyResponse)
            } else {
                responses.remove(0)
            }
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "test"
        }
    }

    fn evaluation_json(scores: [u8; 6]) -> String {
        format!(
            r#"{{
                "overall_score": 75,
                "scores": {{"compliance": {}, "communication": {}, "empathy": {}, "resolution": {}, "accuracy": {}, "tone": {}}},
                "feedback": "Solid call overall.",
                "strengths": ["clear greeting"],
                "improvements": ["confirm contact details"],
                "recommendations": ["use the standard closing"],
                "scoring_notes": "Weighted per call type.",
                "criteria": [
                    {{"id": "GREETING", "result": "PASS", "score": 95, "explanation": "greeted by name"}}
                ]
            }}"#,
            scores[0], scores[1], scores[2], scores[3], scores[4], scores[5]
        )
    }

    fn request<'a>(
        criteria: &'a [Criterion],
        forced: Option<CallType>,
    ) -> AuditRequest<'a> {
        AuditRequest {
            transcript: "customer conversation transcript",
            duration_secs: 180,
            criteria,
            forced_call_type: forced,
            retention_context: None,
        }
    }

    #[tokio::test]
    async fn test_non_scorable_type_short_circuits() {
        let backend = ScriptedBackend::new(vec![]);
        let auditor = Auditor::new(backend.clone(), PolicyTable::standard());
        let criteria = default_criteria();

        let outcome = auditor
            .audit(&request(&criteria, Some(CallType::Voicemail)))
            .await
            .unwrap();

        assert!(!outcome.scorable);
        assert_eq!(outcome.overall_score, 0);
        assert_eq!(outcome.scores, DimensionScores::default());
        assert!(outcome.criteria_results.is_empty());
        assert!(outcome.scoring_notes.contains("not scorable"));
        assert!(!outcome.feedback.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_weighted_overall_score() {
        // Retention weights are [1, 1, 1.2, 1.2, 1, 1] over
        // [compliance, communication, empathy, resolution, accuracy, tone].
        // Raw [80, 90, 70, 60, 85, 75] adjusts to [80, 90, 84, 72, 85, 75]
        // and aggregates to 517.2 / 6.4 = 80.8, rounding to 81.
        let backend =
            ScriptedBackend::new(vec![Ok(evaluation_json([80, 90, 70, 60, 85, 75]))]);
        let auditor = Auditor::new(backend, PolicyTable::standard());
        let criteria = default_criteria();

        let outcome = auditor
            .audit(&request(&criteria, Some(CallType::RetentionCall)))
            .await
            .unwrap();

        assert_eq!(outcome.overall_score, 81);
        assert_eq!(outcome.scores.empathy, 84);
        assert_eq!(outcome.scores.resolution, 72);
        assert_eq!(outcome.scores.compliance, 80);
    }

    #[tokio::test]
    async fn test_scores_clamped() {
        let raw = r#"{
            "scores": {"compliance": -5, "communication": 140, "empathy": "not a number", "resolution": 50, "accuracy": 50, "tone": 50},
            "feedback": "x"
        }"#;
        let backend = ScriptedBackend::new(vec![Ok(raw.to_string())]);
        let auditor = Auditor::new(backend, PolicyTable::standard());
        let criteria = default_criteria();

        let outcome = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap();

        assert_eq!(outcome.scores.compliance, 0);
        assert_eq!(outcome.scores.communication, 100);
        assert_eq!(outcome.scores.empathy, 0);
        assert_eq!(outcome.scores.resolution, 50);
    }

    #[tokio::test]
    async fn test_missing_lists_become_empty() {
        let raw = r#"{"scores": {"compliance": 70}, "strengths": "was polite"}"#;
        let backend = ScriptedBackend::new(vec![Ok(raw.to_string())]);
        let auditor = Auditor::new(backend, PolicyTable::standard());
        let criteria = default_criteria();

        let outcome = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap();

        assert!(outcome.strengths.is_empty());
        assert!(outcome.improvements.is_empty());
        assert!(outcome.criteria_results.is_empty());
    }

    #[tokio::test]
    async fn test_scoring_notes_append_call_type() {
        let backend = ScriptedBackend::new(vec![Ok(evaluation_json([70; 6]))]);
        let auditor = Auditor::new(backend, PolicyTable::standard());
        let criteria = default_criteria();

        let outcome = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap();

        assert!(outcome.scoring_notes.contains("Weighted per call type."));
        assert!(outcome
            .scoring_notes
            .contains("Call Type: live_call (100% confidence)"));
    }

    #[tokio::test]
    async fn test_validation_error_aborts_after_one_attempt() {
        let backend = ScriptedBackend::new(vec![
            Ok("this is not json".to_string()),
            Ok(evaluation_json([70; 6])),
        ]);
        let auditor = Auditor::new(backend.clone(), PolicyTable::standard());
        let criteria = default_criteria();

        let err = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Validation(_)));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_object_response_is_a_validation_error() {
        let backend = ScriptedBackend::new(vec![Ok("[1, 2, 3]".to_string())]);
        let auditor = Auditor::new(backend.clone(), PolicyTable::standard());
        let criteria = default_criteria();

        let err = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Validation(_)));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_retries_three_attempts_then_raises() {
        let backend = ScriptedBackend::new(vec![
            Err(LlmError::Timeout),
            Err(LlmError::Timeout),
            Err(LlmError::Timeout),
        ]);
        let auditor = Auditor::new(backend.clone(), PolicyTable::standard());
        let criteria = default_criteria();

        let err = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Backend(LlmError::Timeout)));
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_then_success() {
        let backend = ScriptedBackend::new(vec![
            Err(LlmError::Timeout),
            Ok(evaluation_json([70; 6])),
        ]);
        let auditor = Auditor::new(backend.clone(), PolicyTable::standard());
        let criteria = default_criteria();

        let outcome = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap();
        assert!(outcome.scorable);
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_safety_block_not_retried() {
        let backend = ScriptedBackend::new(vec![Err(LlmError::SafetyBlocked)]);
        let auditor = Auditor::new(backend.clone(), PolicyTable::standard());
        let criteria = default_criteria();

        let err = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Backend(LlmError::SafetyBlocked)));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_excluded_criteria_filtered_from_prompt() {
        struct Sniffer {
            prompt: Mutex<Option<String>>,
        }

        #[async_trait]
        impl InferenceBackend for Sniffer {
            async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
                *self.prompt.lock() = Some(prompt.to_string());
                Ok(r#"{"scores": {}}"#.to_string())
            }
            async fn is_available(&self) -> bool {
                true
            }
            fn provider_name(&self) -> &str {
                "sniffer"
            }
            fn model_name(&self) -> &str {
                "test"
            }
        }

        let backend = Arc::new(Sniffer {
            prompt: Mutex::new(None),
        });
        let auditor = Auditor::new(backend.clone(), PolicyTable::standard());
        let criteria = default_criteria();

        auditor
            .audit(&request(&criteria, Some(CallType::Transfer)))
            .await
            .unwrap();

        let prompt = backend.prompt.lock().clone().unwrap();
        assert!(!prompt.contains("FULL_RESOLUTION"));
        assert!(prompt.contains("TRANSFER_EXPLANATION"));
    }

    #[tokio::test]
    async fn test_detected_retention_call_gets_retention_block() {
        struct RetentionSniffer {
            audit_prompt: Mutex<Option<String>>,
        }

        #[async_trait]
        impl InferenceBackend for RetentionSniffer {
            async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
                if prompt.starts_with("Classify the type") {
                    Ok(r#"{"call_type": "retention_call", "confidence": 95,
                           "indicators": ["wants to cancel"],
                           "two_way_conversation": true, "customer_engaged": true}"#
                        .to_string())
                } else {
                    *self.audit_prompt.lock() = Some(prompt.to_string());
                    Ok(r#"{"scores": {}}"#.to_string())
                }
            }
            async fn is_available(&self) -> bool {
                true
            }
            fn provider_name(&self) -> &str {
                "sniffer"
            }
            fn model_name(&self) -> &str {
                "test"
            }
        }

        let backend = Arc::new(RetentionSniffer {
            audit_prompt: Mutex::new(None),
        });
        let auditor = Auditor::new(backend.clone(), PolicyTable::standard());
        let criteria = default_criteria();

        // No caller-supplied context; classification alone identifies the
        // call as retention and must still trigger the guidance block.
        let outcome = auditor.audit(&request(&criteria, None)).await.unwrap();
        assert_eq!(outcome.verdict.call_type, CallType::RetentionCall);

        let prompt = backend.audit_prompt.lock().clone().unwrap();
        assert!(prompt.contains("Retention context"));
    }

    #[tokio::test]
    async fn test_provenance_recorded() {
        let backend = ScriptedBackend::new(vec![Ok(evaluation_json([70; 6]))]);
        let auditor = Auditor::new(backend, PolicyTable::standard());
        let criteria = default_criteria();

        let outcome = auditor
            .audit(&request(&criteria, Some(CallType::LiveCall)))
            .await
            .unwrap();
        assert_eq!(outcome.provenance.provider, "scripted");
        assert_eq!(outcome.provenance.model, "test");
    }
}
