//! Conversation analytics types
//!
//! The analytics record has a lifecycle independent of report cards: it is
//! computed once per call after a successful audit and never retried.

use serde::{Deserialize, Serialize};

use crate::call::CallId;

/// Keyword lexicon categories the analyzer accumulates per-category totals for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Compliance,
    Prohibited,
    Empathy,
    Escalation,
}

/// One entry of the active keyword lexicon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub phrase: String,
    pub category: KeywordCategory,
    pub weight: f32,
}

impl KeywordEntry {
    pub fn new(phrase: &str, category: KeywordCategory, weight: f32) -> Self {
        Self {
            phrase: phrase.to_string(),
            category,
            weight,
        }
    }
}

/// A lexicon phrase found in a transcript, with its occurrence count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordHit {
    pub phrase: String,
    pub category: KeywordCategory,
    pub count: u32,
    pub weight: f32,
}

/// Overall sentiment label for a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

/// Keyword and sentiment scan results for one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub call_id: CallId,
    pub sentiment: Sentiment,
    /// Normalized sentiment value in [-1, 1]
    pub sentiment_score: f32,
    pub keyword_hits: Vec<KeywordHit>,
    pub compliance_hits: u32,
    pub prohibited_hits: u32,
    pub empathy_hits: u32,
    pub escalation_hits: u32,
}
