//! Merging of v7 fragments and duplicate sibling nodes.
//!
//! Two precedence rules live here:
//!
//! - [`deep_merge`]: objects merge key by key, every other value from the
//!   later document replaces the earlier one. Used for share `initSources`.
//! - [`merge_siblings`]: sibling nodes naming the same entity collapse into
//!   one, later fields overlaying earlier ones, while child lists
//!   concatenate and are merged again. This reproduces loading the entries
//!   one after another into the v7 runtime.

use serde_json::{Map, Value};

/// Fields holding child nodes. Their values concatenate when siblings merge.
pub const CHILD_FIELDS: [&str; 2] = ["items", "members"];

/// Recursively merge `overlay` into `base`.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Collapse sibling nodes that describe the same entity.
///
/// Nodes match when their string `name`s are equal and either neither has
/// an `id` or both have the same `id`. Nodes without a string name are
/// passed through untouched so they still reach their diagnostic.
pub fn merge_siblings(members: &[Value]) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::with_capacity(members.len());
    for member in members {
        let Some(name) = member.get("name").and_then(Value::as_str) else {
            merged.push(member.clone());
            continue;
        };
        let id = explicit_id(member);
        let matching = merged
            .iter()
            .position(|existing| is_same_entity(existing, name, id));

        match matching {
            Some(index) => {
                tracing::debug!(name, "merging duplicate sibling");
                merged[index] = overlay_sibling(&merged[index], member);
            }
            None => merged.push(overlay_sibling(&Value::Null, member)),
        }
    }
    merged
}

fn explicit_id(member: &Value) -> Option<&Value> {
    member.get("id").filter(|id| !id.is_null())
}

fn is_same_entity(existing: &Value, name: &str, id: Option<&Value>) -> bool {
    if existing.get("name").and_then(Value::as_str) != Some(name) {
        return false;
    }
    match (explicit_id(existing), id) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn overlay_sibling(earlier: &Value, later: &Value) -> Value {
    let mut combined = earlier.as_object().cloned().unwrap_or_default();
    if let Some(later_map) = later.as_object() {
        for (key, value) in later_map {
            combined.insert(key.clone(), value.clone());
        }
    }

    for field in CHILD_FIELDS {
        let before = earlier.get(field).filter(|v| !v.is_null());
        let after = later.get(field).filter(|v| !v.is_null());
        if before.is_none() && after.is_none() {
            continue;
        }
        let mut children = child_list(before);
        children.extend(child_list(after));
        combined.insert(field.to_string(), Value::Array(merge_siblings(&children)));
    }

    Value::Object(combined)
}

fn child_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        None => Vec::new(),
        Some(Value::Array(children)) => children.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// Merge a list of object fragments into one, in order.
pub fn merge_fragments<'a>(fragments: impl IntoIterator<Item = &'a Value>) -> Value {
    let mut merged = Value::Object(Map::new());
    for fragment in fragments {
        deep_merge(&mut merged, fragment.clone());
    }
    merged
}
