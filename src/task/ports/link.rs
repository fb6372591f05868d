//! Tolerant read of reference ("link") field values.
//!
//! A stored link may be a bare id or a list of ids. Readers only look at
//! the first id; blank ids and empty lists read as no link.

use serde_json::Value;

/// Normalizes a stored link to its first id.
///
/// # Examples
///
/// ```rust
/// use hireflow::task::ports::link::first_link;
/// use serde_json::json;
///
/// assert_eq!(first_link(Some(&json!("rec1"))), Some("rec1".to_owned()));
/// assert_eq!(first_link(Some(&json!(["rec1", "rec2"]))), Some("rec1".to_owned()));
/// assert_eq!(first_link(Some(&json!([]))), None);
/// ```
#[must_use]
pub fn first_link(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Array(items) => scalar_id(items.first()?),
        other => scalar_id(other),
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
