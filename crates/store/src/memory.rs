//! In-memory store
//!
//! Backs the server in single-node deployments and every test. Report cards
//! are keyed by call id, so the one-card-per-call uniqueness constraint
//! falls out of the map insert.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use call_audit_core::{
    AiSettings, AnalyticsRecord, Call, CallId, CallStatus, CallType, KeywordEntry, ReportCard,
};

use crate::{CallStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    calls: DashMap<CallId, Call>,
    /// Keyed by call id: at most one report card per call
    report_cards: DashMap<CallId, ReportCard>,
    analytics: DashMap<CallId, AnalyticsRecord>,
    settings: RwLock<AiSettings>,
    lexicon: RwLock<Vec<KeywordEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AiSettings) -> Self {
        let store = Self::default();
        *store.settings.write() = settings;
        store
    }

    pub fn set_ai_settings(&self, settings: AiSettings) {
        *self.settings.write() = settings;
    }

    pub fn set_lexicon(&self, lexicon: Vec<KeywordEntry>) {
        *self.lexicon.write() = lexicon;
    }

    fn is_awaiting_audit(&self, call: &Call, statuses: &[CallStatus]) -> bool {
        statuses.contains(&call.status)
            && call.has_transcript()
            && !self.report_cards.contains_key(&call.id)
    }
}

#[async_trait]
impl CallStore for MemoryStore {
    async fn call(&self, id: CallId) -> Result<Call, StoreError> {
        self.calls
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn insert_call(&self, call: Call) -> Result<(), StoreError> {
        self.calls.insert(call.id, call);
        Ok(())
    }

    async fn calls_awaiting_audit(
        &self,
        statuses: &[CallStatus],
        limit: usize,
    ) -> Result<Vec<Call>, StoreError> {
        let mut eligible: Vec<Call> = self
            .calls
            .iter()
            .filter(|entry| self.is_awaiting_audit(entry.value(), statuses))
            .map(|entry| entry.value().clone())
            .collect();
        // Oldest first, so a backlog drains in arrival order
        eligible.sort_by_key(|c| c.started_at);
        eligible.truncate(limit);
        Ok(eligible)
    }

    async fn pending_audit_count(&self, statuses: &[CallStatus]) -> Result<usize, StoreError> {
        Ok(self
            .calls
            .iter()
            .filter(|entry| self.is_awaiting_audit(entry.value(), statuses))
            .count())
    }

    async fn has_report_card(&self, call_id: CallId) -> Result<bool, StoreError> {
        Ok(self.report_cards.contains_key(&call_id))
    }

    async fn report_card(&self, call_id: CallId) -> Result<Option<ReportCard>, StoreError> {
        Ok(self.report_cards.get(&call_id).map(|entry| entry.clone()))
    }

    async fn insert_report_card(&self, card: ReportCard) -> Result<(), StoreError> {
        let call_id = card.call_id;
        match self.report_cards.entry(call_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Duplicate(call_id)),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                debug!(%call_id, "report card stored");
                vacant.insert(card);
                Ok(())
            }
        }
    }

    async fn set_call_status(
        &self,
        id: CallId,
        status: CallStatus,
        call_type: Option<CallType>,
    ) -> Result<(), StoreError> {
        let mut call = self.calls.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        call.status = status;
        if call_type.is_some() {
            call.call_type = call_type;
        }
        Ok(())
    }

    async fn insert_analytics(&self, record: AnalyticsRecord) -> Result<(), StoreError> {
        self.analytics.insert(record.call_id, record);
        Ok(())
    }

    async fn ai_settings(&self) -> Result<AiSettings, StoreError> {
        Ok(self.settings.read().clone())
    }

    async fn keyword_lexicon(&self) -> Result<Vec<KeywordEntry>, StoreError> {
        Ok(self.lexicon.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_audit_core::{
        AuditOutcome, CallTypeVerdict, DimensionScores, DurationBucket, Provenance,
    };

    fn outcome() -> AuditOutcome {
        AuditOutcome {
            verdict: CallTypeVerdict {
                call_type: CallType::LiveCall,
                confidence: 80,
                indicators: vec![],
                duration_bucket: DurationBucket::Medium,
                two_way_conversation: true,
                customer_engaged: true,
            },
            scorable: true,
            overall_score: 75,
            scores: DimensionScores::default(),
            feedback: String::new(),
            strengths: vec![],
            improvements: vec![],
            recommendations: vec![],
            criteria_results: vec![],
            scoring_notes: String::new(),
            provenance: Provenance {
                provider: "test".to_string(),
                model: "test".to_string(),
                latency_ms: 0,
            },
        }
    }

    #[tokio::test]
    async fn test_duplicate_report_card_rejected() {
        let store = MemoryStore::new();
        let call = Call::transcribed("hello", 60);
        let call_id = call.id;
        store.insert_call(call).await.unwrap();

        store
            .insert_report_card(ReportCard::new(call_id, outcome()))
            .await
            .unwrap();
        let err = store
            .insert_report_card(ReportCard::new(call_id, outcome()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == call_id));
        assert!(store.has_report_card(call_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_awaiting_audit_filters() {
        let store = MemoryStore::new();

        let eligible = Call::transcribed("a real transcript", 60);
        let eligible_id = eligible.id;
        store.insert_call(eligible).await.unwrap();

        let mut no_transcript = Call::transcribed("", 60);
        no_transcript.transcript = None;
        store.insert_call(no_transcript).await.unwrap();

        let mut wrong_status = Call::transcribed("hello", 60);
        wrong_status.status = CallStatus::Audited;
        store.insert_call(wrong_status).await.unwrap();

        let carded = Call::transcribed("hello again", 60);
        let carded_id = carded.id;
        store.insert_call(carded).await.unwrap();
        store
            .insert_report_card(ReportCard::new(carded_id, outcome()))
            .await
            .unwrap();

        let pending = store
            .calls_awaiting_audit(&[CallStatus::Transcribed, CallStatus::AuditFailed], 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, eligible_id);
    }

    #[tokio::test]
    async fn test_awaiting_audit_respects_limit() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store
                .insert_call(Call::transcribed(format!("call {i}"), 60))
                .await
                .unwrap();
        }
        let batch = store
            .calls_awaiting_audit(&[CallStatus::Transcribed], 10)
            .await
            .unwrap();
        assert_eq!(batch.len(), 10);
        assert_eq!(
            store
                .pending_audit_count(&[CallStatus::Transcribed])
                .await
                .unwrap(),
            15
        );
    }

    #[tokio::test]
    async fn test_status_update_tags_call_type() {
        let store = MemoryStore::new();
        let call = Call::transcribed("hello", 60);
        let id = call.id;
        store.insert_call(call).await.unwrap();

        store
            .set_call_status(id, CallStatus::Audited, Some(CallType::PaymentCall))
            .await
            .unwrap();
        let updated = store.call(id).await.unwrap();
        assert_eq!(updated.status, CallStatus::Audited);
        assert_eq!(updated.call_type, Some(CallType::PaymentCall));

        // A later status change without a type keeps the existing tag.
        store
            .set_call_status(id, CallStatus::AuditFailed, None)
            .await
            .unwrap();
        let updated = store.call(id).await.unwrap();
        assert_eq!(updated.call_type, Some(CallType::PaymentCall));
    }

    #[tokio::test]
    async fn test_missing_call_is_not_found() {
        let store = MemoryStore::new();
        let id = uuid::Uuid::new_v4();
        assert!(matches!(
            store.call(id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            store.set_call_status(id, CallStatus::Audited, None).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
