//! Loose field readers for extracted LLM JSON.
//!
//! Models return numbers as strings, lists as comma-joined strings and so on.
//! These helpers accept the common variants and return `None` for anything else,
//! leaving the default to the calling adapter.

use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

/// First non-blank string found under any of `keys`.
pub fn text(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Array(items) => {
                let joined = string_list(&Value::Array(items.clone())).join(" ");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        })
}

/// Integer from a JSON number (rounded) or numeric string.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim().trim_end_matches('%').trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            })
        }
        _ => None,
    }
}

pub fn integer_field(obj: &Object, key: &str) -> Option<i64> {
    obj.get(key).and_then(integer)
}

/// List of non-blank strings from an array, or from a comma-separated string.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// `Some(list)` only when `key` is present and holds a list-shaped value.
pub fn list_field(obj: &Object, key: &str) -> Option<Vec<String>> {
    match obj.get(key)? {
        v @ (Value::Array(_) | Value::String(_)) => Some(string_list(v)),
        _ => None,
    }
}
