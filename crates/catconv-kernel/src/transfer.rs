//! Carry ids over from a previously converted catalog.
//!
//! Re-running a conversion generates fresh random ids. Transferring ids from
//! an earlier v8 output keeps existing share links pointing at the same
//! members.

use crate::member::JsonObject;
use crate::merge::CHILD_FIELDS;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// One id rewritten by [`transfer_ids`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdReplacement {
    /// `root/<name>/...` path of the member.
    pub path: String,
    pub previous: Option<String>,
    pub id: String,
}

/// Replace ids in `target` with the ids `source` has at the same name path.
///
/// Only `source` contributes ids; for each path the first member carrying
/// an id wins.
pub fn transfer_ids(target: &mut [Value], source: &[Value]) -> Vec<IdReplacement> {
    let mut known = HashMap::new();
    record_ids(source, "root", &mut known);

    let mut replacements = Vec::new();
    replace_ids(target, "root", &known, &mut replacements);
    replacements
}

/// Transfer ids into a converted catalog document from a previous one.
///
/// Workbench entries naming a replaced id are rewritten to the transferred
/// id so they keep pointing at their member.
pub fn transfer_catalog_ids(document: &mut JsonObject, previous: &Value) -> Vec<IdReplacement> {
    let source = previous
        .get("catalog")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let replacements = match document.get_mut("catalog") {
        Some(Value::Array(catalog)) => transfer_ids(catalog, source),
        _ => Vec::new(),
    };

    if let Some(Value::Array(workbench)) = document.get_mut("workbench") {
        for entry in workbench.iter_mut() {
            let Some(current) = entry.as_str() else {
                continue;
            };
            if let Some(replacement) = replacements
                .iter()
                .find(|replacement| replacement.previous.as_deref() == Some(current))
            {
                *entry = Value::String(replacement.id.clone());
            }
        }
    }
    replacements
}

fn member_path(parent: &str, member: &Value) -> String {
    let name = member.get("name").and_then(Value::as_str).unwrap_or_default();
    format!("{parent}/{name}")
}

fn children(member: &Value) -> Option<&Vec<Value>> {
    CHILD_FIELDS
        .iter()
        .rev()
        .find_map(|field| member.get(*field).and_then(Value::as_array))
}

fn record_ids(members: &[Value], parent: &str, known: &mut HashMap<String, String>) {
    for member in members {
        let path = member_path(parent, member);
        if let Some(id) = member.get("id").and_then(Value::as_str) {
            known.entry(path.clone()).or_insert_with(|| id.to_string());
        }
        if let Some(children) = children(member) {
            record_ids(children, &path, known);
        }
    }
}

fn replace_ids(
    members: &mut [Value],
    parent: &str,
    known: &HashMap<String, String>,
    replacements: &mut Vec<IdReplacement>,
) {
    for member in members {
        let path = member_path(parent, member);
        let Some(object) = member.as_object_mut() else {
            continue;
        };

        if let Some(id) = known.get(&path) {
            let previous = object.get("id").and_then(Value::as_str).map(str::to_string);
            if previous.as_deref() != Some(id.as_str()) {
                tracing::info!(%path, previous = ?previous, id = %id, "replaced id");
                object.insert("id".to_string(), Value::String(id.clone()));
                replacements.push(IdReplacement {
                    path: path.clone(),
                    previous,
                    id: id.clone(),
                });
            }
        }

        let field = CHILD_FIELDS
            .iter()
            .rev()
            .find(|field| object.get(**field).is_some_and(Value::is_array));
        if let Some(Value::Array(children)) = field.and_then(|field| object.get_mut(*field)) {
            replace_ids(children, &path, known, replacements);
        }
    }
}
