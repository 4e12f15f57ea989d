//! Field path resolution over JSON records.
//!
//! A path like `user.address.city` is walked segment by segment. At
//! any step, a missing key or a non-object value ends the walk with
//! "not found". An explicit JSON `null` at the end is also reported as
//! not found: the missing-value policy treats absent and null
//! uniformly.

use serde_json::Value;

/// Resolve `path` inside `record`.
///
/// Returns `Some(value)` only when every segment resolved and the
/// final value is not `null`. With `disable_dot_notation`, the whole
/// path is looked up as one literal key (for field names that contain
/// dots).
///
/// Type mismatches during traversal (descending into a string, an
/// array, a number) degrade to `None`; resolution never fails.
pub fn resolve<'a>(record: &'a Value, path: &str, disable_dot_notation: bool) -> Option<&'a Value> {
    let found = if disable_dot_notation {
        record.as_object().and_then(|obj| obj.get(path))
    } else {
        let mut current = record;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    };

    found.filter(|v| !v.is_null())
}
