//! Repair of free-form LLM JSON into validated domain records.
//!
//! The LLM collaborator promises nothing about shape: fields go missing,
//! strings arrive as lists, numbers arrive as prose. These functions take an
//! arbitrary [`serde_json::Value`] element and return a record guaranteed to
//! satisfy the schema, applying a deterministic fallback for every field.
//! They never fail; "cannot repair" is not an outcome.

mod story;
mod testcase;

pub use story::normalize_story;
pub use testcase::normalize_testcase;

use serde_json::Value;

/// Scalar to non-empty trimmed string. Strings are trimmed; numbers are
/// rendered; everything else (null, bools, containers) is treated as absent.
fn as_trimmed(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// First non-empty scalar among the alternate key spellings of a field.
fn first_key<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(as_trimmed))
}

/// Lenient element-to-string conversion for list contents: strings are used
/// as-is, nulls dropped, everything else rendered as JSON. Returns `None`
/// when the result is empty after trimming.
fn stringify_element(value: &Value) -> Option<String> {
    let s = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
