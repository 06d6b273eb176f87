//! The batch orchestrator
//!
//! Processing is deliberately sequential: calls run one at a time with an
//! inter-call sleep, bounding concurrent load on the shared inference
//! backend. Failures are caught per call, recorded, and the sweep continues.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use call_audit_auditor::{analyze, AuditRequest, Auditor, PolicyTable};
use call_audit_core::{Call, CallId, CallStatus, CallType, Criterion, ReportCard};
use call_audit_llm::BackendFactory;
use call_audit_store::{CallStore, StoreError};

use crate::PipelineError;

const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Batch selection and pacing knobs.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum calls per sweep
    pub batch_size: usize,
    /// Sleep between calls, skipped after the last one
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            delay: Duration::from_secs(1),
        }
    }
}

/// Emitted after each processed call.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    /// 1-based position within the batch
    pub index: usize,
    pub total: usize,
    pub call_id: CallId,
    pub success: bool,
}

pub type ProgressFn = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Aggregate result of one sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<BatchFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub call_id: CallId,
    pub error: String,
}

/// Result of triggering an audit on a single call.
pub enum TriggerResult {
    /// A fresh report card was produced and stored
    Audited(Box<ReportCard>),
    /// A report card already existed; nothing was done
    AlreadyAudited,
}

pub struct BatchOrchestrator {
    store: Arc<dyn CallStore>,
    factory: Arc<dyn BackendFactory>,
    policies: PolicyTable,
    criteria: Vec<Criterion>,
}

impl BatchOrchestrator {
    pub fn new(
        store: Arc<dyn CallStore>,
        factory: Arc<dyn BackendFactory>,
        policies: PolicyTable,
        criteria: Vec<Criterion>,
    ) -> Self {
        Self {
            store,
            factory,
            policies,
            criteria,
        }
    }

    /// Sweep calls awaiting audit (`transcribed` or `audit_failed`) and
    /// process up to `options.batch_size` of them.
    pub async fn process_pending(
        &self,
        options: &BatchOptions,
        progress: Option<&ProgressFn>,
    ) -> Result<BatchSummary, PipelineError> {
        let statuses = [CallStatus::Transcribed, CallStatus::AuditFailed];
        self.run_batch(&statuses, options.batch_size, options.delay, progress)
            .await
    }

    /// Narrower sweep over `audit_failed` calls only, with a fixed short
    /// inter-call delay.
    pub async fn retry_failed(
        &self,
        batch_size: usize,
        progress: Option<&ProgressFn>,
    ) -> Result<BatchSummary, PipelineError> {
        let statuses = [CallStatus::AuditFailed];
        self.run_batch(&statuses, batch_size, RETRY_DELAY, progress)
            .await
    }

    async fn run_batch(
        &self,
        statuses: &[CallStatus],
        batch_size: usize,
        delay: Duration,
        progress: Option<&ProgressFn>,
    ) -> Result<BatchSummary, PipelineError> {
        let calls = self.store.calls_awaiting_audit(statuses, batch_size).await?;
        let total = calls.len();
        info!(total, "starting audit sweep");

        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        for (i, call) in calls.into_iter().enumerate() {
            let call_id = call.id;
            let success = match self.audit_call(&call, None).await {
                Ok(_) => {
                    summary.successful += 1;
                    true
                }
                Err(e) => {
                    warn!(%call_id, error = %e, "audit failed");
                    summary.failed += 1;
                    summary.errors.push(BatchFailure {
                        call_id,
                        error: e.to_string(),
                    });
                    false
                }
            };

            if let Some(callback) = progress {
                callback(ProgressUpdate {
                    index: i + 1,
                    total,
                    call_id,
                    success,
                });
            }
            if i + 1 < total {
                sleep(delay).await;
            }
        }

        info!(
            successful = summary.successful,
            failed = summary.failed,
            "audit sweep finished"
        );
        Ok(summary)
    }

    /// Audit a single call by id, idempotently: if a report card already
    /// exists, nothing happens and the call reports success.
    pub async fn trigger_audit(
        &self,
        call_id: CallId,
        forced_call_type: Option<CallType>,
    ) -> Result<TriggerResult, PipelineError> {
        if self.store.has_report_card(call_id).await? {
            debug!(%call_id, "report card already exists, skipping");
            return Ok(TriggerResult::AlreadyAudited);
        }
        let call = self.store.call(call_id).await?;
        self.audit_call(&call, forced_call_type).await
    }

    async fn audit_call(
        &self,
        call: &Call,
        forced_call_type: Option<CallType>,
    ) -> Result<TriggerResult, PipelineError> {
        match self.audit_call_inner(call, forced_call_type).await {
            Ok(result) => Ok(result),
            Err(e) => {
                // Leave the call eligible for a retry sweep; a failure to
                // record the failure is secondary to the original error.
                if let Err(status_err) = self
                    .store
                    .set_call_status(call.id, CallStatus::AuditFailed, None)
                    .await
                {
                    warn!(call_id = %call.id, error = %status_err, "failed to mark call audit_failed");
                }
                Err(e)
            }
        }
    }

    async fn audit_call_inner(
        &self,
        call: &Call,
        forced_call_type: Option<CallType>,
    ) -> Result<TriggerResult, PipelineError> {
        let transcript = call
            .transcript
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(PipelineError::MissingTranscript(call.id))?;

        let settings = self.store.ai_settings().await?;
        let backend = self.factory.backend_for(&settings)?;
        let auditor = Auditor::new(backend, self.policies.clone());

        let retention_context = retention_context(call);
        let request = AuditRequest {
            transcript,
            duration_secs: call.duration_seconds,
            criteria: &self.criteria,
            forced_call_type,
            retention_context: retention_context.as_deref(),
        };

        let outcome = auditor.audit(&request).await?;
        let detected_type = outcome.verdict.call_type;
        let card = ReportCard::new(call.id, outcome);

        match self.store.insert_report_card(card.clone()).await {
            Ok(()) => {}
            // A concurrent sweep got there first; its card stands.
            Err(StoreError::Duplicate(_)) => {
                debug!(call_id = %call.id, "concurrent audit already stored a report card");
                self.store
                    .set_call_status(call.id, CallStatus::Audited, None)
                    .await?;
                return Ok(TriggerResult::AlreadyAudited);
            }
            Err(e) => return Err(e.into()),
        }
        self.store
            .set_call_status(call.id, CallStatus::Audited, Some(detected_type))
            .await?;

        // Analytics lives its own life; a failure here never fails the audit.
        match self.store.keyword_lexicon().await {
            Ok(lexicon) => {
                let record = analyze(call.id, transcript, &lexicon);
                if let Err(e) = self.store.insert_analytics(record).await {
                    warn!(call_id = %call.id, error = %e, "failed to store analytics record");
                }
            }
            Err(e) => warn!(call_id = %call.id, error = %e, "failed to load keyword lexicon"),
        }

        Ok(TriggerResult::Audited(Box::new(card)))
    }
}

/// A call counts as a retention interaction when its campaign says so or a
/// previous audit tagged it as a retention call.
fn retention_context(call: &Call) -> Option<String> {
    let campaign_retention = call
        .campaign
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains("retention"));
    if campaign_retention {
        return Some(format!(
            "Campaign: {}.",
            call.campaign.as_deref().unwrap_or_default()
        ));
    }
    if call.call_type == Some(CallType::RetentionCall) {
        return Some("Previously identified as a retention call.".to_string());
    }
    None
}
