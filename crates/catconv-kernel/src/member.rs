//! Catalog member views and conversion results.

use crate::message::Message;
use serde::Serialize;
use serde_json::{Map, Value};

/// An untyped JSON object: raw v7 nodes and converted v8 members alike.
pub type JsonObject = Map<String, Value>;

/// A raw node that has passed the catalog-member shape check: an object with
/// a string `type` and, outside partial mode, a string `name`.
#[derive(Debug, Clone, Copy)]
pub struct CatalogMember<'a> {
    raw: &'a JsonObject,
    type_name: &'a str,
    name: Option<&'a str>,
}

impl<'a> CatalogMember<'a> {
    /// View `raw` as a catalog member, if it has the required shape.
    pub fn from_value(raw: &'a Value, partial: bool) -> Option<Self> {
        let object = raw.as_object()?;
        let type_name = object.get("type")?.as_str()?;
        let name = object.get("name").and_then(Value::as_str);
        if name.is_none() && !partial {
            return None;
        }
        Some(Self {
            raw: object,
            type_name,
            name,
        })
    }

    /// View an object under an explicit type, as for embedded property bags
    /// that carry no `type` of their own.
    pub fn with_type(raw: &'a JsonObject, type_name: &'a str) -> Self {
        Self {
            raw,
            type_name,
            name: raw.get("name").and_then(Value::as_str),
        }
    }

    pub fn raw(&self) -> &'a JsonObject {
        self.raw
    }

    pub fn type_name(&self) -> &'a str {
        self.type_name
    }

    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    /// Label used in diagnostic paths.
    pub fn label(&self) -> String {
        match self.name {
            Some(name) => name.to_string(),
            None => format!("<{} without name>", self.type_name),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.raw.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    pub fn has_str(&self, key: &str) -> bool {
        self.get_str(key).is_some()
    }

    pub fn get_object(&self, key: &str) -> Option<&'a JsonObject> {
        self.raw.get(key).and_then(Value::as_object)
    }

    /// Start a v8 member of `v8_type` carrying this member's name.
    pub fn v8_member(&self, v8_type: &str) -> JsonObject {
        let mut member = JsonObject::new();
        member.insert("type".to_string(), Value::String(v8_type.to_string()));
        if let Some(name) = self.name {
            member.insert("name".to_string(), Value::String(name.to_string()));
        }
        member
    }
}

/// Whether a raw node is marked `isEnabled: true`.
pub fn is_enabled(raw: &Value) -> bool {
    raw.get("isEnabled").and_then(Value::as_bool) == Some(true)
}

/// A converted member whose source was enabled, in conversion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnabledItem {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl EnabledItem {
    pub fn from_member(member: &JsonObject) -> Self {
        Self {
            id: member.get("id").and_then(Value::as_str).map(str::to_string),
            name: member.get("name").and_then(Value::as_str).map(str::to_string),
        }
    }
}

/// Result of converting one node.
///
/// `member` is `None` exactly when a fatal message was produced for this
/// node. `enabled` lists enabled descendants found while converting it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberResult {
    pub member: Option<JsonObject>,
    pub messages: Vec<Message>,
    pub enabled: Vec<EnabledItem>,
}

impl MemberResult {
    pub fn null(message: Message) -> Self {
        Self {
            member: None,
            messages: vec![message],
            enabled: Vec::new(),
        }
    }

    pub fn converted(member: JsonObject, messages: Vec<Message>) -> Self {
        Self {
            member: Some(member),
            messages,
            enabled: Vec::new(),
        }
    }
}

/// Result of converting an array of nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembersResult {
    pub members: Vec<JsonObject>,
    pub messages: Vec<Message>,
    pub enabled: Vec<EnabledItem>,
}
