//! Response extractor: recovers a JSON value from free-form LLM text.
//!
//! Phase 1: strip a leading/trailing Markdown fence and parse the remainder.
//! Phase 2: parse the span from the first `[` or `{` to the last matching
//! closing bracket, which handles prose before or after the payload.
//!
//! Plain-text replies go through `clean_plain_text` instead.

use serde_json::Value;

/// Returns the JSON value embedded in `text`, or `None` when neither phase parses.
pub fn extract_json(text: &str) -> Option<Value> {
    let cleaned = strip_json_fences(text);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }

    let start = cleaned.find(['[', '{'])?;
    let close = if cleaned[start..].starts_with('[') { ']' } else { '}' };
    let end = cleaned.rfind(close)?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<Value>(&cleaned[start..=end]).ok()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// Each side is stripped independently, so a truncated reply that lost its
/// closing fence still loses the opening one.
pub fn strip_json_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }
    text.trim()
}

/// Trims and strips one pair of wrapping quotes. Blank → `None`.
pub fn clean_plain_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let unquoted = [('"', '"'), ('\'', '\''), ('“', '”')]
        .iter()
        .find_map(|&(open, close)| {
            trimmed
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
        })
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}
