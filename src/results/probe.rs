// src/results/probe.rs

use serde_json::{Map, Value};

/// Reads one candidate location out of a payload.
pub type Accessor = fn(&Value) -> Option<&Value>;

/// Returns the first value produced by `accessors`, tried in order,
/// for which `accept` holds.
pub fn first_matching<'a>(
    value: &'a Value,
    accessors: &[Accessor],
    accept: impl Fn(&Value) -> bool,
) -> Option<&'a Value> {
    accessors
        .iter()
        .filter_map(|accessor| accessor(value))
        .find(|candidate| accept(candidate))
}

/// Returns the first accessor result that is present and not JSON `null`.
pub fn first_present<'a>(value: &'a Value, accessors: &[Accessor]) -> Option<&'a Value> {
    first_matching(value, accessors, |candidate| !candidate.is_null())
}

/// Returns the first accessor result that is a JSON object with at least one entry.
pub fn first_non_empty_object<'a>(
    value: &'a Value,
    accessors: &[Accessor],
) -> Option<&'a Map<String, Value>> {
    first_matching(value, accessors, |candidate| {
        candidate.as_object().is_some_and(|map| !map.is_empty())
    })
    .and_then(Value::as_object)
}

/// Walks `path` through nested objects.
pub fn at_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Returns the first non-null value found at any of `paths`, tried in order.
pub fn first_at_paths<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| at_path(value, path))
        .find(|candidate| !candidate.is_null())
}
