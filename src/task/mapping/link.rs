//! Reference ("link") field normalization.
//!
//! Reads are tolerant and shared with the repository filters through
//! [`first_link`]. Writes are strict: a link is always written as a list,
//! possibly empty, because the repository's own consistency depends on the
//! list form.

use serde_json::Value;

pub use crate::task::ports::link::first_link;

/// Encodes a link for writing: always a list.
///
/// # Examples
///
/// ```rust
/// use hireflow::task::mapping::link::link_value;
/// use serde_json::json;
///
/// assert_eq!(link_value(Some("rec1")), json!(["rec1"]));
/// assert_eq!(link_value(None), json!([]));
/// ```
#[must_use]
pub fn link_value(id: Option<&str>) -> Value {
    Value::Array(
        id.map(|linked| Value::String(linked.to_owned()))
            .into_iter()
            .collect(),
    )
}
