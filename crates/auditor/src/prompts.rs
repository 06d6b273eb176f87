//! Prompt construction for classification and adaptive auditing.

use std::fmt::Write as _;

use call_audit_core::{CallType, CallTypeVerdict, Criterion, Dimension, DurationBucket};

use crate::policy::ScoringPolicy;

const CLASSIFY_TRANSCRIPT_LIMIT: usize = 5_000;
const AUDIT_TRANSCRIPT_LIMIT: usize = 12_000;

/// Truncate to at most `limit` characters.
fn truncate_transcript(transcript: &str, limit: usize) -> &str {
    match transcript.char_indices().nth(limit) {
        Some((end, _)) => &transcript[..end],
        None => transcript,
    }
}

/// Build the call-type classification prompt. Lists every known label with
/// its definition so the model picks from a closed set.
pub fn classification_prompt(transcript: &str, duration_secs: u32) -> String {
    let mut prompt = String::with_capacity(2_048);
    prompt.push_str(
        "Classify the type of this recorded call based on its transcript and duration.\n\n",
    );
    let _ = writeln!(prompt, "Call duration: {duration_secs} seconds");
    let _ = writeln!(
        prompt,
        "Duration bucket: {}",
        DurationBucket::from_seconds(duration_secs)
    );
    prompt.push_str("\nPossible call types:\n");
    for call_type in CallType::ALL {
        let _ = writeln!(prompt, "- {}: {}", call_type, call_type.definition());
    }
    let _ = write!(
        prompt,
        "\nTranscript:\n{}\n\n\
         Respond with valid JSON only, in exactly this shape:\n\
         {{\"call_type\": \"<one of the labels above>\", \"confidence\": <0-100>, \
         \"indicators\": [\"<textual clue>\"], \"two_way_conversation\": <true|false>, \
         \"customer_engaged\": <true|false>}}",
        truncate_transcript(transcript, CLASSIFY_TRANSCRIPT_LIMIT)
    );
    prompt
}

/// Build the adaptive audit prompt for a scorable call. The dimension
/// weights and the filtered criteria list shape what the model evaluates,
/// so a transfer call is never penalized for lacking a full resolution.
pub fn audit_prompt(
    transcript: &str,
    duration_secs: u32,
    verdict: &CallTypeVerdict,
    policy: &ScoringPolicy,
    criteria: &[Criterion],
    retention_context: Option<&str>,
) -> String {
    let mut prompt = String::with_capacity(4_096);

    prompt.push_str("Evaluate this call transcript for quality and compliance.\n\n");
    let _ = writeln!(
        prompt,
        "Call type: {} ({}% confidence)",
        verdict.call_type, verdict.confidence
    );
    if !verdict.indicators.is_empty() {
        let _ = writeln!(prompt, "Classification indicators: {}", verdict.indicators.join("; "));
    }
    let _ = writeln!(prompt, "Call duration: {duration_secs} seconds");
    let _ = writeln!(prompt, "Duration bucket: {}", verdict.duration_bucket);
    let _ = writeln!(
        prompt,
        "Two-way conversation: {}, customer engaged: {}",
        verdict.two_way_conversation, verdict.customer_engaged
    );

    prompt.push_str("\nDimension weights for this call type (percent emphasis):\n");
    for dimension in Dimension::ALL {
        let _ = writeln!(
            prompt,
            "- {}: {}%",
            dimension,
            (policy.weights.get(dimension) * 100.0).round()
        );
    }

    prompt.push_str("\nEvaluate each of the following criteria:\n");
    for criterion in criteria {
        let _ = writeln!(
            prompt,
            "- {}: {} ({}) - {}",
            criterion.id, criterion.name, criterion.dimension, criterion.description
        );
    }

    if !policy.mandatory_criteria.is_empty() {
        let _ = writeln!(
            prompt,
            "\nMandatory criteria for this call type (weigh these heavily): {}",
            policy.mandatory_criteria.join(", ")
        );
    }

    if let Some(context) = retention_context {
        let _ = writeln!(
            prompt,
            "\nRetention context: this is a customer retention interaction. {context}\n\
             Pay particular attention to how objections were handled and whether a retention offer was made."
        );
    }

    let _ = write!(
        prompt,
        "\nTranscript:\n{}\n\n\
         Respond with valid JSON only, in exactly this shape:\n\
         {{\n\
           \"overall_score\": <0-100>,\n\
           \"scores\": {{\"compliance\": <0-100>, \"communication\": <0-100>, \"empathy\": <0-100>, \"resolution\": <0-100>, \"accuracy\": <0-100>, \"tone\": <0-100>}},\n\
           \"feedback\": \"<overall assessment>\",\n\
           \"strengths\": [\"...\"],\n\
           \"improvements\": [\"...\"],\n\
           \"recommendations\": [\"...\"],\n\
           \"scoring_notes\": \"<how the weights influenced scoring>\",\n\
           \"criteria\": [{{\"id\": \"<criterion id>\", \"result\": \"PASS|PARTIAL|FAIL|N/A\", \"score\": <0-100>, \"explanation\": \"...\", \"recommendation\": \"...\"}}]\n\
         }}",
        truncate_transcript(transcript, AUDIT_TRANSCRIPT_LIMIT)
    );
    prompt
}
