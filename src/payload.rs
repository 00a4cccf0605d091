//! Schema-tolerant accessors for upstream JSON payloads.
//!
//! Upstream feeds disagree on where the per-player list lives and what
//! the fields are called. Every accepted spelling is an ordered candidate
//! list consulted in priority order; adding a new alias is a data change
//! here, not a code change in the pipeline.

use serde_json::Value;

use crate::names::normalize_name;

/// Top-level (and one-level-nested) keys that may hold the player list.
pub const PLAYER_LIST_KEYS: &[&str] = &[
    "players",
    "data",
    "rankings",
    "field",
    "baseline",
    "baseline_history_fit",
];

const NESTED_LIST_KEYS: &[&str] = &["players", "field", "entries"];

/// Accepted spellings for the player name field.
pub const NAME_KEYS: &[&str] = &["player_name", "name", "player"];

const EMPTY: &[Value] = &[];

/// Locate the per-player record list inside a payload. A bare array is
/// accepted as-is; otherwise the candidate keys are tried in order,
/// including one level of nesting (`{"data": {"players": [...]}}`).
pub fn player_records(payload: &Value) -> &[Value] {
    if let Value::Array(items) = payload {
        return items;
    }
    let Value::Object(map) = payload else {
        return EMPTY;
    };
    for key in PLAYER_LIST_KEYS {
        match map.get(*key) {
            Some(Value::Array(items)) if !items.is_empty() => return items,
            Some(Value::Object(inner)) => {
                for sub in NESTED_LIST_KEYS {
                    if let Some(Value::Array(items)) = inner.get(*sub) {
                        if !items.is_empty() {
                            return items;
                        }
                    }
                }
            }
            _ => {}
        }
    }
    EMPTY
}

/// First non-empty string under any of the candidate keys.
pub fn first_str<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    for key in keys {
        if let Some(s) = record.get(*key).and_then(Value::as_str) {
            if !s.trim().is_empty() {
                return Some(s);
            }
        }
    }
    None
}

/// First numeric value under any of the candidate keys. Numeric strings
/// are accepted too; anything unparseable resolves to a miss for that
/// key, never an error.
pub fn first_f64(record: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(v) = record.get(*key).and_then(value_as_f64) {
            return Some(v);
        }
    }
    None
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Normalized join key for one record; `None` when no usable name is
/// present, which discards the record upstream.
pub fn record_key(record: &Value) -> Option<String> {
    let key = normalize_name(first_str(record, NAME_KEYS)?);
    if key.is_empty() { None } else { Some(key) }
}
