//! HTTP endpoints
//!
//! REST API over the audit pipeline.

use std::time::Duration;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use call_audit_core::{CallStatus, CallType, ReportCard};
use call_audit_llm::LlmError;
use call_audit_pipeline::{BatchOptions, PipelineError, ProgressFn, TriggerResult};
use call_audit_store::StoreError;

use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/queue/process", post(process_queue))
        .route("/api/queue/retry-failed", post(retry_failed))
        .route("/api/queue/pending", get(pending_count))
        .route("/api/calls/:id/audit", post(audit_call))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            PipelineError::MissingTranscript(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Backend(LlmError::Configuration(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Backend(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.to_string())
    }
}

fn progress_logger() -> ProgressFn {
    Box::new(|update| {
        tracing::info!(
            index = update.index,
            total = update.total,
            call_id = %update.call_id,
            success = update.success,
            "queue progress"
        );
    })
}

#[derive(Debug, Default, Deserialize)]
struct QueueBody {
    /// Override the configured batch size for this sweep
    batch_size: Option<usize>,
}

/// Sweep the backlog of transcribed and previously failed calls.
async fn process_queue(
    State(state): State<AppState>,
    body: Option<Json<QueueBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let batch_size = body
        .and_then(|Json(b)| b.batch_size)
        .unwrap_or(state.settings.batch.batch_size);
    let options = BatchOptions {
        batch_size,
        delay: Duration::from_millis(state.settings.batch.delay_ms),
    };
    let progress = progress_logger();
    let summary = state
        .orchestrator
        .process_pending(&options, Some(&progress))
        .await?;
    Ok(Json(summary))
}

/// Re-run audits for calls whose last attempt failed.
async fn retry_failed(
    State(state): State<AppState>,
    body: Option<Json<QueueBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let batch_size = body
        .and_then(|Json(b)| b.batch_size)
        .unwrap_or(state.settings.batch.batch_size);
    let progress = progress_logger();
    let summary = state
        .orchestrator
        .retry_failed(batch_size, Some(&progress))
        .await?;
    Ok(Json(summary))
}

/// How many calls are currently awaiting audit.
async fn pending_count(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let statuses = [CallStatus::Transcribed, CallStatus::AuditFailed];
    let pending = state.store.pending_audit_count(&statuses).await?;
    Ok(Json(json!({ "pending": pending })))
}

#[derive(Debug, Default, Deserialize)]
struct AuditCallBody {
    /// Skip classification and audit as this type
    call_type: Option<CallType>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AuditCallResponse {
    Audited { report_card: Box<ReportCard> },
    AlreadyAudited,
}

/// Trigger an audit for one call. Idempotent: a call that already has a
/// report card reports success without a second audit.
async fn audit_call(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<AuditCallBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let forced = body.and_then(|Json(b)| b.call_type);
    let result = state.orchestrator.trigger_audit(id, forced).await?;
    let response = match result {
        TriggerResult::Audited(card) => AuditCallResponse::Audited { report_card: card },
        TriggerResult::AlreadyAudited => AuditCallResponse::AlreadyAudited,
    };
    Ok(Json(response))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
