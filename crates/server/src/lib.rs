//! Call audit server
//!
//! HTTP surface over the batch orchestrator: queue sweeps, per-call audit
//! triggers and a health probe.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
