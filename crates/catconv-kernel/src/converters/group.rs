//! Plain catalog groups: the converter that recurses.

use super::props::{
    CATALOG_GROUP_IGNORE, CATALOG_GROUP_PROPS, CATALOG_MEMBER_IGNORE, CATALOG_MEMBER_PROPS,
    copy_keys, copy_props, props_to_warnings, unknown_props,
};
use crate::convert::Converter;
use crate::member::{CatalogMember, MemberResult};
use crate::message::{Message, ModelType};
use crate::options::ConversionOptions;
use serde_json::Value;

/// `group`: children in `items` become v8 `members`.
pub fn group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    let label = member.label();
    let items = member.get("items").and_then(Value::as_array);
    if items.is_none() && !options.partial {
        return MemberResult::null(Message::missing_required_prop(
            ModelType::Group,
            "items",
            Some("array"),
            &label,
        ));
    }

    let children = items.map(|items| converter.convert_members_array(items, &label, options));

    let raw = member.raw();
    let unknown = unknown_props(
        raw,
        &[CATALOG_MEMBER_PROPS, CATALOG_GROUP_PROPS],
        &[CATALOG_MEMBER_IGNORE, CATALOG_GROUP_IGNORE],
    );

    let mut converted = member.v8_member("group");
    let mut messages = Vec::new();
    let mut enabled = Vec::new();
    if let Some(children) = children {
        converted.insert(
            "members".to_string(),
            Value::Array(children.members.into_iter().map(Value::Object).collect()),
        );
        messages = children.messages;
        enabled = children.enabled;
    }
    messages.extend(props_to_warnings(ModelType::Group, &unknown, &label));

    if options.copy_unknown_properties {
        copy_keys(raw, &mut converted, &unknown);
    }
    copy_props(raw, &mut converted, CATALOG_MEMBER_PROPS);
    copy_props(raw, &mut converted, CATALOG_GROUP_PROPS);

    MemberResult {
        member: Some(converted),
        messages,
        enabled,
    }
}
