//! Keyword and sentiment scan
//!
//! A pure function over transcript text and an active keyword lexicon.
//! Runs independently of the auditor and never blocks on it.

use call_audit_core::{AnalyticsRecord, CallId, KeywordCategory, KeywordEntry, KeywordHit, Sentiment};

const POSITIVE_WORDS: [&str; 10] = [
    "thank",
    "appreciate",
    "understand",
    "help",
    "great",
    "excellent",
    "happy",
    "glad",
    "wonderful",
    "perfect",
];

const NEGATIVE_WORDS: [&str; 10] = [
    "angry",
    "upset",
    "frustrated",
    "terrible",
    "awful",
    "horrible",
    "hate",
    "worst",
    "never",
    "ridiculous",
];

/// Scan a transcript against the lexicon and the fixed sentiment word lists.
pub fn analyze(call_id: CallId, transcript: &str, lexicon: &[KeywordEntry]) -> AnalyticsRecord {
    let lower = transcript.to_lowercase();

    let mut keyword_hits = Vec::new();
    let mut compliance_hits = 0u32;
    let mut prohibited_hits = 0u32;
    let mut empathy_hits = 0u32;
    let mut escalation_hits = 0u32;

    for entry in lexicon {
        let phrase = entry.phrase.to_lowercase();
        if phrase.is_empty() {
            continue;
        }
        let count = lower.matches(&phrase).count() as u32;
        if count == 0 {
            continue;
        }
        match entry.category {
            KeywordCategory::Compliance => compliance_hits += count,
            KeywordCategory::Prohibited => prohibited_hits += count,
            KeywordCategory::Empathy => empathy_hits += count,
            KeywordCategory::Escalation => escalation_hits += count,
        }
        keyword_hits.push(KeywordHit {
            phrase: entry.phrase.clone(),
            category: entry.category,
            count,
            weight: entry.weight,
        });
    }

    let (sentiment, sentiment_score) = score_sentiment(&lower);

    AnalyticsRecord {
        call_id,
        sentiment,
        sentiment_score,
        keyword_hits,
        compliance_hits,
        prohibited_hits,
        empathy_hits,
        escalation_hits,
    }
}

/// Sentiment from fixed word lists, normalized per 100 words and clamped
/// to [-1, 1].
fn score_sentiment(lower: &str) -> (Sentiment, f32) {
    let mut word_count = 0u32;
    let mut positive = 0u32;
    let mut negative = 0u32;

    for token in lower.split_whitespace() {
        let word: String = token.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        if word.is_empty() {
            continue;
        }
        word_count += 1;
        if POSITIVE_WORDS.contains(&word.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            negative += 1;
        }
    }

    let divisor = (word_count as f32 / 100.0).max(1.0);
    let score = ((positive as f32 - negative as f32) / divisor).clamp(-1.0, 1.0);

    let sentiment = if score > 0.3 {
        Sentiment::Positive
    } else if score < -0.3 {
        Sentiment::Negative
    } else if positive > 2 && negative > 2 {
        Sentiment::Mixed
    } else {
        Sentiment::Neutral
    };
    (sentiment, score)
}

/// A small built-in lexicon used when no custom keyword set is configured.
pub fn default_lexicon() -> Vec<KeywordEntry> {
    use KeywordCategory::*;
    vec![
        KeywordEntry::new("this call may be recorded", Compliance, 1.0),
        KeywordEntry::new("mini miranda", Compliance, 1.0),
        KeywordEntry::new("attempt to collect a debt", Compliance, 1.0),
        KeywordEntry::new("guarantee", Prohibited, 1.5),
        KeywordEntry::new("lawsuit", Prohibited, 2.0),
        KeywordEntry::new("garnish", Prohibited, 2.0),
        KeywordEntry::new("i understand", Empathy, 1.0),
        KeywordEntry::new("i'm sorry", Empathy, 1.0),
        KeywordEntry::new("i apologize", Empathy, 1.0),
        KeywordEntry::new("supervisor", Escalation, 1.0),
        KeywordEntry::new("manager", Escalation, 1.0),
        KeywordEntry::new("complaint", Escalation, 1.5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_keyword_counting() {
        let lexicon = default_lexicon();
        let transcript = "I understand your concern. Let me get my supervisor. \
                          Again, I understand this is frustrating.";
        let record = analyze(Uuid::new_v4(), transcript, &lexicon);

        assert_eq!(record.empathy_hits, 2);
        assert_eq!(record.escalation_hits, 1);
        assert_eq!(record.compliance_hits, 0);
        let hit = record
            .keyword_hits
            .iter()
            .find(|h| h.phrase == "i understand")
            .unwrap();
        assert_eq!(hit.count, 2);
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        let lexicon = vec![KeywordEntry::new("Supervisor", KeywordCategory::Escalation, 1.0)];
        let record = analyze(Uuid::new_v4(), "get me your SUPERVISOR now", &lexicon);
        assert_eq!(record.escalation_hits, 1);
    }

    #[test]
    fn test_sentiment_bounded_and_asymmetric() {
        let positive = "thank you so much, this is great, excellent help ".repeat(10);
        let negative = "this is terrible, awful, the worst, I hate it ".repeat(10);

        let pos = analyze(Uuid::new_v4(), &positive, &[]);
        let neg = analyze(Uuid::new_v4(), &negative, &[]);

        assert!(pos.sentiment_score > 0.0);
        assert!(neg.sentiment_score < 0.0);
        assert!(pos.sentiment_score <= 1.0);
        assert!(neg.sentiment_score >= -1.0);
        assert_ne!(pos.sentiment_score, neg.sentiment_score);
        assert_eq!(pos.sentiment, Sentiment::Positive);
        assert_eq!(neg.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_long_neutral_transcript() {
        let transcript = "the account balance was discussed and the customer will call back \
                          next week to continue the conversation about options "
            .repeat(20);
        let record = analyze(Uuid::new_v4(), &transcript, &[]);
        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert!(record.sentiment_score.abs() < 0.3);
    }

    #[test]
    fn test_mixed_sentiment() {
        // Equal positive and negative hits on a long transcript keep the
        // score near zero while both counts exceed the mixed threshold.
        let filler = "word ".repeat(400);
        let transcript = format!(
            "{filler} thank you great excellent help terrible awful frustrated upset"
        );
        let record = analyze(Uuid::new_v4(), &transcript, &[]);
        assert_eq!(record.sentiment, Sentiment::Mixed);
        assert!(record.sentiment_score.abs() <= 0.3);
    }

    #[test]
    fn test_punctuation_stripped_from_tokens() {
        let record = analyze(Uuid::new_v4(), "Thank! you, great?", &[]);
        assert!(record.sentiment_score > 0.0);
    }
}
