//! Core types for the call-audit pipeline
//!
//! This crate provides the domain vocabulary shared by all other crates:
//! - Calls and their lifecycle status
//! - Call-type verdicts produced by classification
//! - Audit outcomes, report cards and evaluation criteria
//! - Conversation analytics records and keyword lexicon types
//! - The externally-managed AI settings record
//! - Error types

pub mod analytics;
pub mod call;
pub mod criteria;
pub mod error;
pub mod outcome;
pub mod settings;
pub mod verdict;

pub use analytics::{
    AnalyticsRecord, KeywordCategory, KeywordEntry, KeywordHit, Sentiment,
};
pub use call::{Call, CallId, CallStatus};
pub use criteria::{default_criteria, Criterion};
pub use error::{Error, Result};
pub use outcome::{
    AuditOutcome, CriterionResult, CriterionVerdict, Dimension, DimensionScores, Provenance,
    ReportCard,
};
pub use settings::AiSettings;
pub use verdict::{CallType, CallTypeVerdict, DurationBucket};
