//! Tolerant parsing of structured model responses
//!
//! Models wrap JSON in markdown fences, preamble prose, or both. Parsing is
//! forgiving about the wrapping and defensive about the contents: scores
//! clamp to [0,100] with non-numeric treated as 0, and list fields that are
//! not arrays become empty lists instead of failing the audit.

use serde_json::Value;

use call_audit_core::{CriterionResult, CriterionVerdict};

use crate::AuditError;

/// Extract a JSON value from a raw model response.
///
/// Strips markdown code fences, then tries a direct parse; on failure, falls
/// back to the first balanced `{...}` block in the text.
pub fn extract_json(raw: &str) -> Result<Value, AuditError> {
    let mut text = raw.trim();

    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }
    let text = text.trim();

    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    if let Some(block) = first_balanced_object(text) {
        if let Ok(value) = serde_json::from_str(block) {
            return Ok(value);
        }
    }

    Err(AuditError::Validation(
        "response is not parseable JSON".to_string(),
    ))
}

/// Find the first balanced top-level `{...}` block, respecting strings and
/// escape sequences so braces inside explanations don't confuse the scan.
fn first_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Clamp a raw value into the integer score range [0, 100].
/// NaN and infinities collapse to 0.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

/// Read a numeric score field; non-numeric (including numeric strings that
/// don't parse and missing fields) becomes 0.
pub fn score_field(obj: &Value, key: &str) -> u8 {
    let value = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    clamp_score(value)
}

/// Read an optional string field, defaulting to empty.
pub fn string_field(obj: &Value, key: &str) -> String {
    obj.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Read a string-array field; anything that isn't an array becomes empty.
pub fn string_list(obj: &Value, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Read the per-criterion results array defensively. Entries missing an id
/// are dropped; everything else gets lenient defaults.
pub fn criteria_list(obj: &Value, key: &str) -> Vec<CriterionResult> {
    let Some(Value::Array(items)) = obj.get(key) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let id = item.get("id")?.as_str()?.to_string();
            Some(CriterionResult {
                id,
                verdict: CriterionVerdict::from_label(
                    item.get("result").and_then(|v| v.as_str()).unwrap_or(""),
                ),
                score: score_field(item, "score"),
                explanation: string_field(item, "explanation"),
                recommendation: item
                    .get("recommendation")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            })
        })
        .collect()
}
