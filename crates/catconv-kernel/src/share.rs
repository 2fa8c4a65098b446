//! v7 share document migration.
//!
//! A v7 share is a list of init sources: URLs of init files and object
//! fragments. The fragments are merged into one, its shared members are
//! re-keyed from legacy path ids to v8 ids, and the result is emitted as a
//! single `user` stratum fragment behind the original URLs.

use crate::convert::Converter;
use crate::member::{JsonObject, is_enabled};
use crate::merge::merge_fragments;
use crate::message::{Message, ModelType};
use crate::options::ConversionOptions;
use serde::Serialize;
use serde_json::{Value, json};

pub const ROOT_GROUP_LEGACY_ID: &str = "Root Group";
pub const USER_ADDED_LEGACY_ID: &str = "Root Group/User-Added Data";
pub const ROOT_GROUP_ID: &str = "/";
pub const USER_ADDED_CATEGORY_ID: &str = "__User-Added_Data__";
pub const SHARE_VERSION: &str = "8.0.0";

/// View state copied from the merged fragment when present.
const VIEW_PROPS: [&str; 8] = [
    "initialCamera",
    "homeCamera",
    "baseMapName",
    "viewerMode",
    "currentTime",
    "showSplitter",
    "splitPosition",
    "previewedItemId",
];

/// Output of [`convert_share`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareResult {
    pub result: Option<Value>,
    pub messages: Vec<Message>,
    /// `false` when the input was already v8 or could not be converted.
    pub converted: bool,
}

impl ShareResult {
    fn failed(message: Message) -> Self {
        Self {
            result: None,
            messages: vec![message],
            converted: false,
        }
    }
}

/// Map a legacy sentinel id to its v8 id. Only exact sentinels are
/// rewritten.
pub fn legacy_id_to_v8(id: &str) -> String {
    match id {
        ROOT_GROUP_LEGACY_ID => ROOT_GROUP_ID.to_string(),
        USER_ADDED_LEGACY_ID => USER_ADDED_CATEGORY_ID.to_string(),
        other => other.to_string(),
    }
}

/// A shared member that was enabled, with its legacy workbench position.
struct WorkbenchCandidate {
    id: String,
    index: Option<u64>,
}

impl Converter<'_> {
    /// Migrate a v7 share document. v8 documents are returned unchanged.
    pub fn convert_share(&mut self, raw: &Value) -> ShareResult {
        let Some(source) = raw.as_object() else {
            return ShareResult::failed(Message::input_not_plain_object());
        };

        if source
            .get("version")
            .and_then(Value::as_str)
            .is_some_and(|version| version.starts_with('8'))
        {
            return ShareResult {
                result: Some(raw.clone()),
                messages: Vec::new(),
                converted: false,
            };
        }

        let Some(init_sources) = source.get("initSources").and_then(Value::as_array) else {
            return ShareResult::failed(Message::missing_required_prop(
                ModelType::Share,
                "initSources",
                None,
                "Init sources",
            ));
        };

        let urls: Vec<Value> = init_sources.iter().filter(|s| s.is_string()).cloned().collect();
        let merged = merge_fragments(init_sources.iter().filter(|s| s.is_object()));
        let options = ConversionOptions::partial();
        let mut messages = Vec::new();
        let mut models = JsonObject::new();
        let mut candidates = Vec::new();

        if let Some(shared) = merged.get("sharedCatalogMembers").and_then(Value::as_object) {
            for (key, node) in shared {
                let id = node
                    .get("id")
                    .and_then(Value::as_str)
                    .map_or_else(|| legacy_id_to_v8(key), str::to_string);
                if is_enabled(node) {
                    candidates.push(WorkbenchCandidate {
                        id: id.clone(),
                        index: node.get("nowViewingIndex").and_then(Value::as_u64),
                    });
                }

                let result = self.convert_member(node, &options);
                messages.extend(result.messages);
                let Some(mut model) = result.member else {
                    continue;
                };
                if let Some(parents) = node.get("parents").and_then(Value::as_array) {
                    let containers = parents
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|parent| Value::String(legacy_id_to_v8(parent)))
                        .collect();
                    model.insert("knownContainerUniqueIds".to_string(), Value::Array(containers));
                }
                models.insert(id, Value::Object(model));
            }
        }

        if let Some(user_added) = merged
            .get("catalog")
            .and_then(Value::as_array)
            .and_then(|catalog| catalog.iter().find(|node| is_user_added_data(node)))
        {
            let mut stripped = user_added.clone();
            strip_ids(&mut stripped);
            let result = self.convert_member(&stripped, &options);
            messages.extend(result.messages);
            if let Some(mut model) = result.member {
                if let Some(Value::Array(children)) = model.get_mut("members") {
                    children
                        .iter_mut()
                        .filter_map(Value::as_object_mut)
                        .for_each(fallback_child_id);
                }
                model.insert("knownContainerUniqueIds".to_string(), json!([ROOT_GROUP_ID]));
                models.insert(USER_ADDED_CATEGORY_ID.to_string(), Value::Object(model));
            }
        }

        let stories = match merged.get("stories").and_then(Value::as_array) {
            Some(stories) => {
                let mut migrated = Vec::with_capacity(stories.len());
                for story in stories {
                    migrated.push(self.migrate_story(story, &mut messages));
                }
                Some(migrated)
            }
            None => None,
        };

        let workbench = workbench_order(candidates);
        tracing::info!(
            models = models.len(),
            workbench = workbench.len(),
            messages = messages.len(),
            "share converted"
        );

        let mut fragment = JsonObject::new();
        fragment.insert("stratum".to_string(), json!("user"));
        fragment.insert("models".to_string(), Value::Object(models));
        fragment.insert(
            "workbench".to_string(),
            Value::Array(workbench.into_iter().map(Value::String).collect()),
        );
        if let Some(stories) = stories {
            fragment.insert("stories".to_string(), Value::Array(stories));
        }
        for key in VIEW_PROPS {
            if let Some(value) = merged.get(key) {
                fragment.insert(key.to_string(), value.clone());
            }
        }

        let mut init_sources = urls;
        init_sources.push(Value::Object(fragment));
        ShareResult {
            result: Some(json!({"version": SHARE_VERSION, "initSources": init_sources})),
            messages,
            converted: true,
        }
    }

    /// Migrate a story's embedded share document in place of the original.
    /// A missing `shareData` is reported like any non-object share.
    fn migrate_story(&mut self, story: &Value, messages: &mut Vec<Message>) -> Value {
        let share_data = story.get("shareData").unwrap_or(&Value::Null);
        let title = story.get("title").and_then(Value::as_str).unwrap_or_default();
        let result = self.convert_share(share_data);
        messages.extend(
            result
                .messages
                .into_iter()
                .map(|message| message.prefixed_with(&["Story", title])),
        );

        let mut migrated = story.clone();
        if let Some(object) = migrated.as_object_mut() {
            object.insert("shareData".to_string(), result.result.unwrap_or(Value::Null));
        }
        migrated
    }
}

/// Legacy id of a catalog node: its `id`, else its root path.
fn legacy_id(node: &Value) -> Option<String> {
    if let Some(id) = node.get("id").and_then(Value::as_str) {
        return Some(id.to_string());
    }
    let name = node.get("name").and_then(Value::as_str)?;
    Some(format!("{ROOT_GROUP_LEGACY_ID}/{name}"))
}

fn is_user_added_data(node: &Value) -> bool {
    legacy_id(node).as_deref() == Some(USER_ADDED_LEGACY_ID)
        && node
            .get("items")
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty())
}

/// Remove every `id` so conversion assigns fresh ones.
fn strip_ids(value: &mut Value) {
    match value {
        Value::Object(object) => {
            object.remove("id");
            object.values_mut().for_each(strip_ids);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_ids),
        _ => {}
    }
}

fn fallback_child_id(child: &mut JsonObject) {
    if child.get("id").and_then(Value::as_str).is_some() {
        return;
    }
    if let Some(name) = child.get("name").and_then(Value::as_str) {
        let id = format!("{ROOT_GROUP_ID}{name}");
        child.insert("id".to_string(), Value::String(id));
    }
}

/// Indexed candidates by index, then unindexed ones in encounter order.
/// Each id is kept once, at its first position.
fn workbench_order(mut candidates: Vec<WorkbenchCandidate>) -> Vec<String> {
    candidates.sort_by_key(|candidate| (candidate.index.is_none(), candidate.index));
    let mut workbench: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !workbench.contains(&candidate.id) {
            workbench.push(candidate.id);
        }
    }
    workbench
}

/// Migrate a v7 share document with the built-in registry and random ids.
pub fn convert_share(raw: &Value) -> ShareResult {
    Converter::default().convert_share(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RandomIdGenerator;
    use crate::message::MessageDetails;
    use crate::registry::Registry;

    fn converter() -> Converter<'static> {
        Converter::new(Registry::builtin(), Box::new(RandomIdGenerator::seeded(11)))
    }

    fn fragment(result: &ShareResult) -> &JsonObject {
        result
            .result
            .as_ref()
            .and_then(|share| share["initSources"].as_array())
            .and_then(|sources| sources.last())
            .and_then(Value::as_object)
            .expect("converted share ends with a fragment")
    }

    #[test]
    fn legacy_sentinels_map_exactly() {
        assert_eq!(legacy_id_to_v8("Root Group"), "/");
        assert_eq!(legacy_id_to_v8("Root Group/User-Added Data"), "__User-Added_Data__");
        assert_eq!(legacy_id_to_v8("Root Group/Transport"), "Root Group/Transport");
        assert_eq!(legacy_id_to_v8("abc"), "abc");
    }

    #[test]
    fn v8_share_is_returned_unchanged() {
        let share = json!({"version": "8.1.0", "initSources": [{"stratum": "user"}]});
        let result = converter().convert_share(&share);
        assert!(!result.converted);
        assert!(result.messages.is_empty());
        assert_eq!(result.result, Some(share));
    }

    #[test]
    fn missing_init_sources_is_fatal() {
        let result = converter().convert_share(&json!({"version": "7.0.0"}));
        assert!(result.result.is_none());
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].path, vec!["Init sources"]);
        assert!(matches!(
            result.messages[0].details,
            MessageDetails::MissingRequiredProp { model_type: ModelType::Share, .. }
        ));

        let not_object = converter().convert_share(&json!("share"));
        assert_eq!(not_object.messages, vec![Message::input_not_plain_object()]);
    }

    #[test]
    fn urls_stay_in_front_of_the_merged_fragment() {
        let share = json!({"initSources": [
            "init/a.json",
            {"baseMapName": "Positron", "homeCamera": {"west": 1}},
            "init/b.json",
            {"baseMapName": "Voyager", "unused": 1},
            7,
        ]});
        let result = converter().convert_share(&share);
        assert!(result.converted);
        let output = result.result.expect("share converts");
        assert_eq!(output["version"], json!("8.0.0"));
        assert_eq!(
            output["initSources"],
            json!([
                "init/a.json",
                "init/b.json",
                {
                    "stratum": "user",
                    "models": {},
                    "workbench": [],
                    "homeCamera": {"west": 1},
                    "baseMapName": "Voyager",
                },
            ])
        );
    }

    #[test]
    fn shared_members_are_rekeyed_and_ordered_on_the_workbench() {
        let share = json!({"initSources": [{
            "sharedCatalogMembers": {
                "Root Group/Roads": {
                    "name": "Roads", "type": "csv", "url": "roads.csv",
                    "isEnabled": true, "nowViewingIndex": 1,
                    "parents": ["Root Group"],
                },
                "Root Group/Rail": {
                    "id": "rail", "name": "Rail", "type": "csv", "url": "rail.csv",
                    "isEnabled": true, "nowViewingIndex": 0,
                    "parents": ["Root Group", "Root Group/User-Added Data"],
                },
                "Root Group/Bus": {
                    "name": "Bus", "type": "csv", "url": "bus.csv", "isEnabled": true,
                },
                "Root Group/Off": {"name": "Off", "type": "csv", "url": "off.csv"},
            },
        }]});
        let result = converter().convert_share(&share);
        let unknown: Vec<_> = result
            .messages
            .iter()
            .map(|message| (message.is_error(), message.path.clone()))
            .collect();
        assert_eq!(
            unknown,
            vec![
                (false, vec!["Roads".to_string()]),
                (false, vec!["Rail".to_string()]),
            ],
            "only the legacy nowViewingIndex is reported"
        );
        let fragment = fragment(&result);

        assert_eq!(
            fragment["workbench"],
            json!(["rail", "Root Group/Roads", "Root Group/Bus"])
        );
        let models = fragment["models"].as_object().expect("models object");
        assert_eq!(models.len(), 4);
        assert_eq!(
            models["rail"]["knownContainerUniqueIds"],
            json!(["/", "__User-Added_Data__"])
        );
        assert_eq!(models["Root Group/Roads"]["type"], json!("csv"));
        assert!(!models["Root Group/Off"].as_object().is_some_and(|m| m.contains_key("knownContainerUniqueIds")));
    }

    #[test]
    fn duplicate_workbench_ids_are_kept_once() {
        let candidates = vec![
            WorkbenchCandidate { id: "b".to_string(), index: None },
            WorkbenchCandidate { id: "a".to_string(), index: Some(2) },
            WorkbenchCandidate { id: "b".to_string(), index: Some(1) },
            WorkbenchCandidate { id: "c".to_string(), index: None },
        ];
        assert_eq!(workbench_order(candidates), vec!["b", "a", "c"]);
    }

    #[test]
    fn user_added_data_gets_fresh_ids() {
        let share = json!({"initSources": [{
            "catalog": [
                {"name": "Other", "type": "group", "items": []},
                {
                    "name": "User-Added Data",
                    "type": "group",
                    "id": "Root Group/User-Added Data",
                    "items": [{"name": "Upload", "type": "csv", "id": "old", "data": "a,b"}],
                },
            ],
        }]});
        let result = converter().convert_share(&share);
        let models = fragment(&result)["models"].as_object().expect("models object");
        let user_added = models["__User-Added_Data__"].as_object().expect("user-added model");
        assert_eq!(user_added["knownContainerUniqueIds"], json!(["/"]));
        assert!(!user_added.contains_key("id"));

        let child_id = user_added["members"][0]["id"].as_str().expect("child id");
        assert_ne!(child_id, "old");
        assert_eq!(fragment(&result)["workbench"], json!([]));
    }

    #[test]
    fn user_added_children_fall_back_to_path_ids() {
        let mut child = json!({"name": "Upload", "type": "csv"});
        fallback_child_id(child.as_object_mut().expect("object"));
        assert_eq!(child["id"], json!("/Upload"));

        let mut kept = json!({"name": "Upload", "id": "abc"});
        fallback_child_id(kept.as_object_mut().expect("object"));
        assert_eq!(kept["id"], json!("abc"));
    }

    #[test]
    fn stories_are_migrated_with_prefixed_messages() {
        let share = json!({"initSources": [{
            "stories": [
                {"title": "Intro", "text": "hello", "shareData": {"initSources": [{
                    "sharedCatalogMembers": {"x": {"name": "X", "type": "FAKE"}},
                }]}},
                {"title": "Broken", "shareData": {"version": "7"}},
                {"title": "Plain"},
            ],
        }]});
        let result = converter().convert_share(&share);
        let stories = fragment(&result)["stories"].as_array().expect("stories");
        assert_eq!(stories.len(), 3);
        assert_eq!(stories[0]["text"], json!("hello"));
        assert_eq!(stories[0]["shareData"]["version"], json!("8.0.0"));
        assert_eq!(stories[1]["shareData"], Value::Null);
        assert_eq!(stories[2], json!({"title": "Plain", "shareData": null}));

        let paths: Vec<_> = result.messages.iter().map(|message| message.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec!["Story".to_string(), "Intro".to_string(), "X".to_string()],
                vec!["Story".to_string(), "Broken".to_string(), "Init sources".to_string()],
                vec!["Story".to_string(), "Plain".to_string()],
            ]
        );
        assert_eq!(
            result.messages[2].details,
            MessageDetails::InputNotPlainObject
        );
    }
}
