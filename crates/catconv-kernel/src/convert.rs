//! Member dispatch, members-array conversion and catalog assembly.
//!
//! [`Converter`] is the context the recursion runs through: a group converter
//! calls [`Converter::convert_members_array`], which calls
//! [`Converter::convert_member`] for every child, which dispatches back into
//! the registry. Messages bubble up with each enclosing label prepended.

use crate::ids::{IdGenerator, RandomIdGenerator};
use crate::member::{CatalogMember, EnabledItem, JsonObject, MemberResult, MembersResult, is_enabled};
use crate::merge::merge_siblings;
use crate::message::{Message, ModelType, prefix_all};
use crate::options::ConversionOptions;
use crate::registry::Registry;
use serde::Serialize;
use serde_json::Value;

/// Top-level keys copied from a v7 catalog regardless of options.
pub const CATALOG_PASS_THROUGH: [&str; 2] = ["corsDomains", "homeCamera"];

/// Prefix of v7 path ids recorded in `shareKeys`.
pub const SHARE_KEY_ROOT: &str = "Root Group";

/// Output of [`convert_catalog`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogResult {
    /// `None` only when the input was not a JSON object.
    pub result: Option<JsonObject>,
    pub messages: Vec<Message>,
}

/// Conversion context: the registry to dispatch through and the source of
/// generated ids.
pub struct Converter<'r> {
    registry: &'r Registry,
    ids: Box<dyn IdGenerator>,
}

impl Default for Converter<'static> {
    fn default() -> Self {
        Self::new(Registry::builtin(), Box::new(RandomIdGenerator::new()))
    }
}

impl<'r> Converter<'r> {
    pub fn new(registry: &'r Registry, ids: Box<dyn IdGenerator>) -> Self {
        Self { registry, ids }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Draw a fresh id of the configured length.
    pub fn generate_id(&mut self, options: &ConversionOptions) -> Option<String> {
        self.ids.generate(Some(options.id_length))
    }

    /// Convert one raw node through its registered converter.
    pub fn convert_member(&mut self, raw: &Value, options: &ConversionOptions) -> MemberResult {
        let Some(member) = CatalogMember::from_value(raw, options.partial) else {
            return MemberResult::null(invalid_member(raw));
        };

        let Some(entry) = self.registry.get(member.type_name()).copied() else {
            tracing::debug!(type_name = member.type_name(), "no converter registered");
            return MemberResult::null(Message::unknown_type(member.type_name(), &member.label()));
        };

        tracing::debug!(
            type_name = member.type_name(),
            model_type = %entry.model_type,
            "dispatching member"
        );
        (entry.convert)(self, &member, options)
    }

    /// Convert sibling nodes after merging duplicates.
    ///
    /// Members lacking an id receive a generated one when
    /// `options.generate_ids` is set. Messages are prefixed with
    /// `container_label`.
    pub fn convert_members_array(
        &mut self,
        raw_members: &[Value],
        container_label: &str,
        options: &ConversionOptions,
    ) -> MembersResult {
        let merged = merge_siblings(raw_members);
        let mut members = Vec::with_capacity(merged.len());
        let mut messages = Vec::new();
        let mut enabled = Vec::new();

        for raw in &merged {
            let result = self.convert_member(raw, options);
            messages.extend(prefix_all(result.messages, container_label));

            let Some(mut member) = result.member else {
                continue;
            };
            if options.generate_ids && !has_id(&member) {
                if let Some(id) = self.generate_id(options) {
                    member.insert("id".to_string(), Value::String(id));
                }
            }

            enabled.extend(result.enabled);
            if is_enabled(raw) {
                enabled.push(EnabledItem::from_member(&member));
            }
            members.push(member);
        }

        MembersResult {
            members,
            messages,
            enabled,
        }
    }

    /// Convert a whole v7 catalog document.
    pub fn convert_catalog(&mut self, raw: &Value, options: &ConversionOptions) -> CatalogResult {
        let Some(source) = raw.as_object() else {
            return CatalogResult {
                result: None,
                messages: vec![Message::input_not_plain_object()],
            };
        };

        let mut result = JsonObject::new();
        let mut messages = Vec::new();
        let mut enabled = Vec::new();

        if let Some(Value::Array(catalog)) = source.get("catalog") {
            let converted = self.convert_members_array(catalog, "catalog", options);
            let mut members: Vec<Value> = converted.members.into_iter().map(Value::Object).collect();
            if options.add_v7_auto_id_share_keys {
                add_share_keys(&mut members, SHARE_KEY_ROOT);
            }
            result.insert("catalog".to_string(), Value::Array(members));
            messages = converted.messages;
            enabled = converted.enabled;
        }

        let workbench: Vec<Value> = enabled
            .into_iter()
            .filter_map(|item| match item.id {
                Some(id) => Some(id),
                None if options.generate_ids => self.generate_id(options),
                None => None,
            })
            .map(Value::String)
            .collect();
        if !workbench.is_empty() {
            result.insert("workbench".to_string(), Value::Array(workbench));
        }

        for key in CATALOG_PASS_THROUGH {
            if let Some(value) = source.get(key) {
                result.insert(key.to_string(), value.clone());
            }
        }
        if options.copy_unknown_properties {
            for (key, value) in source {
                let computed = matches!(key.as_str(), "catalog" | "workbench");
                if !computed && !CATALOG_PASS_THROUGH.contains(&key.as_str()) {
                    result.insert(key.clone(), value.clone());
                }
            }
        }

        tracing::debug!(messages = messages.len(), "catalog converted");
        CatalogResult {
            result: Some(result),
            messages,
        }
    }
}

fn has_id(member: &JsonObject) -> bool {
    member
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty())
}

fn invalid_member(raw: &Value) -> Message {
    let type_name = raw.get("type").and_then(Value::as_str);
    let name = raw.get("name").and_then(Value::as_str);
    match type_name {
        Some(type_name) => Message::missing_required_prop(
            ModelType::Member,
            "name",
            Some("string"),
            &format!("<Invalid CatalogMember type = \"{type_name}\">"),
        ),
        None => Message::missing_required_prop(
            ModelType::Member,
            "type",
            Some("string"),
            name.unwrap_or("<Invalid CatalogMember>"),
        ),
    }
}

/// Record each member's v7 path id in its `shareKeys`.
fn add_share_keys(members: &mut [Value], parent_path: &str) {
    for member in members {
        let Some(object) = member.as_object_mut() else {
            continue;
        };
        let Some(name) = object.get("name").and_then(Value::as_str) else {
            continue;
        };
        let path = format!("{parent_path}/{name}");

        match object.get_mut("shareKeys") {
            Some(Value::Array(keys)) => {
                if !keys.iter().any(|key| key.as_str() == Some(path.as_str())) {
                    keys.push(Value::String(path.clone()));
                }
            }
            _ => {
                object.insert(
                    "shareKeys".to_string(),
                    Value::Array(vec![Value::String(path.clone())]),
                );
            }
        }

        if let Some(Value::Array(children)) = object.get_mut("members") {
            add_share_keys(children, &path);
        }
    }
}

/// Convert one node with the built-in registry and random ids.
pub fn convert_member(raw: &Value, options: &ConversionOptions) -> MemberResult {
    Converter::default().convert_member(raw, options)
}

/// Convert a v7 catalog document with the built-in registry and random ids.
pub fn convert_catalog(raw: &Value, options: &ConversionOptions) -> CatalogResult {
    Converter::default().convert_catalog(raw, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageDetails, RequiredProperty, Severity};
    use serde_json::json;

    fn converter() -> Converter<'static> {
        Converter::new(Registry::builtin(), Box::new(RandomIdGenerator::seeded(3)))
    }

    fn no_ids() -> ConversionOptions {
        ConversionOptions {
            generate_ids: false,
            add_v7_auto_id_share_keys: false,
            ..ConversionOptions::default()
        }
    }

    fn property_of(message: &Message) -> Option<&RequiredProperty> {
        match &message.details {
            MessageDetails::MissingRequiredProp { property, .. } => Some(property),
            _ => None,
        }
    }

    #[test]
    fn group_without_name_reports_name() {
        let result = converter().convert_member(&json!({"type": "group"}), &no_ids());
        assert!(result.member.is_none());
        assert_eq!(result.messages.len(), 1);
        assert_eq!(property_of(&result.messages[0]), Some(&RequiredProperty::from("name")));
        assert_eq!(result.messages[0].path, vec!["<Invalid CatalogMember type = \"group\">"]);
    }

    #[test]
    fn member_without_type_reports_type() {
        let result = converter().convert_member(&json!({"name": "X"}), &no_ids());
        assert!(result.member.is_none());
        assert_eq!(property_of(&result.messages[0]), Some(&RequiredProperty::from("type")));
        assert_eq!(result.messages[0].path, vec!["X"]);

        let anonymous = converter().convert_member(&json!(17), &no_ids());
        assert_eq!(anonymous.messages[0].path, vec!["<Invalid CatalogMember>"]);
    }

    #[test]
    fn unknown_type_is_fatal_at_node_label() {
        let result = converter().convert_member(&json!({"name": "bad", "type": "FAKE"}), &no_ids());
        assert!(result.member.is_none());
        assert_eq!(
            result.messages[0].details,
            MessageDetails::UnknownType {
                type_name: "FAKE".to_string()
            }
        );
        assert_eq!(result.messages[0].path, vec!["bad"]);
    }

    #[test]
    fn failure_inside_group_is_contained() {
        let group = json!({
            "name": "G",
            "type": "group",
            "items": [
                {"name": "a", "type": "csv", "url": "a.csv"},
                {"name": "bad", "type": "FAKE"},
                {"name": "c", "type": "csv", "url": "c.csv"},
            ],
        });
        let result = converter().convert_member(&group, &no_ids());
        let member = result.member.expect("group converts");
        assert_eq!(member["members"].as_array().map(Vec::len), Some(2));

        let errors: Vec<_> = result.messages.iter().filter(|m| m.is_error()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, vec!["G", "bad"]);
    }

    #[test]
    fn members_array_prefixes_label_and_assigns_ids() {
        let options = ConversionOptions {
            id_length: 10,
            ..ConversionOptions::default()
        };
        let result = converter().convert_members_array(
            &[
                json!({"name": "a", "type": "csv", "url": "a.csv", "extra": 1}),
                json!({"name": "b", "type": "csv", "url": "b.csv", "id": "keep"}),
            ],
            "catalog",
            &options,
        );
        assert_eq!(result.members.len(), 2);
        assert_eq!(result.members[0]["id"].as_str().map(str::len), Some(10));
        assert_eq!(result.members[1]["id"], json!("keep"));
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].path, vec!["catalog", "a"]);
        assert_eq!(result.messages[0].severity, Severity::Warning);
    }

    #[test]
    fn enabled_items_are_post_order() {
        let catalog = json!({"catalog": [{
            "name": "outer",
            "type": "group",
            "isEnabled": true,
            "id": "outer-id",
            "items": [
                {"name": "inner", "type": "csv", "url": "x", "isEnabled": true, "id": "inner-id"},
                {"name": "off", "type": "csv", "url": "y", "id": "off-id"},
            ],
        }]});
        let result = converter().convert_catalog(&catalog, &no_ids());
        let output = result.result.expect("catalog converts");
        assert_eq!(output["workbench"], json!(["inner-id", "outer-id"]));
    }

    #[test]
    fn empty_catalog_has_no_workbench_or_messages() {
        let result = converter().convert_catalog(&json!({"catalog": []}), &ConversionOptions::default());
        assert!(result.messages.is_empty());
        assert_eq!(Value::Object(result.result.expect("object input")), json!({"catalog": []}));
    }

    #[test]
    fn non_object_catalog_is_rejected() {
        for input in [json!([]), json!("catalog"), json!(null)] {
            let result = converter().convert_catalog(&input, &ConversionOptions::default());
            assert!(result.result.is_none());
            assert_eq!(result.messages, vec![Message::input_not_plain_object()]);
        }
    }

    #[test]
    fn share_keys_follow_final_tree() {
        let catalog = json!({"catalog": [{
            "name": "Top",
            "type": "group",
            "items": [{"name": "Leaf", "type": "csv", "url": "x", "shareKeys": ["old"]}],
        }]});
        let options = ConversionOptions {
            generate_ids: false,
            ..ConversionOptions::default()
        };
        let output = converter()
            .convert_catalog(&catalog, &options)
            .result
            .expect("catalog converts");
        assert_eq!(output["catalog"][0]["shareKeys"], json!(["Root Group/Top"]));
        assert_eq!(
            output["catalog"][0]["members"][0]["shareKeys"],
            json!(["old", "Root Group/Top/Leaf"])
        );
    }

    #[test]
    fn top_level_fields_pass_through() {
        let catalog = json!({
            "catalog": [],
            "corsDomains": ["a.example"],
            "homeCamera": {"west": 1},
            "parameters": {"x": 1},
        });
        let plain = converter()
            .convert_catalog(&catalog, &no_ids())
            .result
            .expect("catalog converts");
        assert!(plain.contains_key("corsDomains"));
        assert!(plain.contains_key("homeCamera"));
        assert!(!plain.contains_key("parameters"));

        let copying = ConversionOptions {
            copy_unknown_properties: true,
            ..no_ids()
        };
        let copied = converter()
            .convert_catalog(&catalog, &copying)
            .result
            .expect("catalog converts");
        assert_eq!(copied["parameters"], json!({"x": 1}));
    }

    #[test]
    fn copied_fields_never_replace_the_computed_workbench() {
        let catalog = json!({
            "catalog": [{"name": "A", "type": "csv", "url": "a.csv", "id": "a", "isEnabled": true}],
            "workbench": ["stale"],
        });
        let copying = ConversionOptions {
            copy_unknown_properties: true,
            ..no_ids()
        };
        let result = converter()
            .convert_catalog(&catalog, &copying)
            .result
            .expect("catalog converts");
        assert_eq!(result["workbench"], json!(["a"]));

        let nothing_enabled = json!({"catalog": [], "workbench": ["stale"]});
        let result = converter()
            .convert_catalog(&nothing_enabled, &copying)
            .result
            .expect("catalog converts");
        assert!(!result.contains_key("workbench"));
    }
}
