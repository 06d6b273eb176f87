//! Application state
//!
//! Shared state across all handlers.

use std::sync::Arc;

use call_audit_auditor::PolicyTable;
use call_audit_config::Settings;
use call_audit_core::default_criteria;
use call_audit_llm::BackendFactory;
use call_audit_pipeline::BatchOrchestrator;
use call_audit_store::CallStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn CallStore>,
    pub orchestrator: Arc<BatchOrchestrator>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        store: Arc<dyn CallStore>,
        factory: Arc<dyn BackendFactory>,
    ) -> Self {
        let orchestrator = Arc::new(BatchOrchestrator::new(
            store.clone(),
            factory,
            PolicyTable::standard(),
            default_criteria(),
        ));
        Self {
            settings,
            store,
            orchestrator,
        }
    }
}
