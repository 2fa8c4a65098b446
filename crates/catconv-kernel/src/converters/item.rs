//! Declarative item conversion.
//!
//! Most v7 types differ only in their v8 type, required fields and extra
//! copy rules. An [`ItemSpec`] records those differences and
//! [`convert_item`] applies the shared steps:
//!
//! 1. required-field check (skipped in partial mode)
//! 2. unknown-field warnings, and verbatim copies when requested
//! 3. base, imagery and type-specific copy rules
//! 4. feature info template, legends, tile error options
//! 5. embedded `itemProperties`

use super::props::{
    CATALOG_GROUP_IGNORE, CATALOG_GROUP_PROPS, CATALOG_MEMBER_IGNORE, CATALOG_MEMBER_PROPS,
    CopyProp, IMAGERY_PROPS, LEGEND_KEYS, TILE_ERROR_KEYS, copy_keys, copy_props,
    feature_info_template, item_properties, legends, props_to_warnings,
    tile_error_handling_options, unknown_props,
};
use crate::convert::Converter;
use crate::member::{CatalogMember, JsonObject, MemberResult};
use crate::message::{Message, ModelType};
use crate::options::ConversionOptions;
use crate::registry::TypeConverter;

/// Which shared copy rules a type starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Member,
    Group,
}

/// String fields a type needs before it can convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    Nothing,
    /// Every field, checked in order; the first missing one is reported.
    All(&'static [&'static str]),
    /// At least one of the fields.
    AnyOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct ItemSpec {
    pub v8_type: &'static str,
    pub model_type: ModelType,
    pub base: Base,
    pub required: Required,
    pub props: &'static [CopyProp],
    /// Known fields handled outside the copy rules.
    pub known: &'static [&'static str],
    pub imagery: bool,
    pub legends: bool,
    pub feature_info: bool,
    pub tile_errors: bool,
    /// Converter for an embedded `itemProperties` bag.
    pub item_properties: Option<TypeConverter>,
}

impl ItemSpec {
    pub const fn new(v8_type: &'static str, model_type: ModelType) -> Self {
        Self {
            v8_type,
            model_type,
            base: Base::Member,
            required: Required::Nothing,
            props: &[],
            known: &[],
            imagery: false,
            legends: false,
            feature_info: false,
            tile_errors: false,
            item_properties: None,
        }
    }

    fn base_props(&self) -> &'static [CopyProp] {
        match self.base {
            Base::Member => &[],
            Base::Group => CATALOG_GROUP_PROPS,
        }
    }

    fn base_ignore(&self) -> &'static [&'static str] {
        match self.base {
            Base::Member => &[],
            Base::Group => CATALOG_GROUP_IGNORE,
        }
    }

    fn imagery_props(&self) -> &'static [CopyProp] {
        if self.imagery { IMAGERY_PROPS } else { &[] }
    }

    /// Fields outside every copy rule and known list.
    pub fn unknown_props(&self, source: &JsonObject) -> Vec<String> {
        let handled: &[&str] = match (self.feature_info, self.item_properties.is_some()) {
            (true, true) => &["featureInfoTemplate", "itemProperties"],
            (true, false) => &["featureInfoTemplate"],
            (false, true) => &["itemProperties"],
            (false, false) => &[],
        };
        unknown_props(
            source,
            &[
                CATALOG_MEMBER_PROPS,
                self.base_props(),
                self.imagery_props(),
                self.props,
            ],
            &[
                CATALOG_MEMBER_IGNORE,
                self.base_ignore(),
                if self.legends { LEGEND_KEYS } else { &[] },
                if self.tile_errors { TILE_ERROR_KEYS } else { &[] },
                self.known,
                handled,
            ],
        )
    }

    /// The error for the first unmet requirement, if any.
    pub fn check_required(&self, member: &CatalogMember<'_>) -> Option<Message> {
        let label = member.label();
        match self.required {
            Required::Nothing => None,
            Required::All(fields) => fields
                .iter()
                .find(|field| !member.has_str(field))
                .map(|field| {
                    Message::missing_required_prop(self.model_type, *field, Some("string"), &label)
                }),
            Required::AnyOf(fields) => (!fields.iter().any(|field| member.has_str(field)))
                .then(|| Message::missing_required_prop(self.model_type, fields, None, &label)),
        }
    }
}

/// Required check, then [`build_item`].
pub fn convert_item(
    converter: &mut Converter<'_>,
    spec: &ItemSpec,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    if !options.partial {
        if let Some(error) = spec.check_required(member) {
            return MemberResult::null(error);
        }
    }
    let (converted, messages) = build_item(converter, spec, member, options);
    MemberResult::converted(converted, messages)
}

/// Build the v8 member for `spec` without checking required fields.
pub fn build_item(
    converter: &mut Converter<'_>,
    spec: &ItemSpec,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> (JsonObject, Vec<Message>) {
    let raw = member.raw();
    let label = member.label();
    let unknown = spec.unknown_props(raw);
    let mut messages = props_to_warnings(spec.model_type, &unknown, &label);

    let mut converted = member.v8_member(spec.v8_type);
    if options.copy_unknown_properties {
        copy_keys(raw, &mut converted, &unknown);
    }
    copy_props(raw, &mut converted, CATALOG_MEMBER_PROPS);
    copy_props(raw, &mut converted, spec.base_props());
    copy_props(raw, &mut converted, spec.imagery_props());
    copy_props(raw, &mut converted, spec.props);

    if spec.feature_info {
        if let Some((template, template_messages)) = raw
            .get("featureInfoTemplate")
            .and_then(|template| feature_info_template(spec.model_type, &label, template))
        {
            converted.insert("featureInfoTemplate".to_string(), template);
            messages.extend(template_messages);
        }
    }
    if spec.legends {
        if let Some(legends) = legends(raw) {
            converted.insert("legends".to_string(), legends);
        }
    }
    if spec.tile_errors {
        if let Some(tile_errors) = tile_error_handling_options(raw) {
            converted.insert("tileErrorHandlingOptions".to_string(), tile_errors);
        }
    }
    if let Some(convert) = spec.item_properties {
        if let Some((properties, bag_messages)) = item_properties(converter, member, convert, options) {
            if let Some(properties) = properties {
                converted.insert("itemProperties".to_string(), properties.into());
            }
            messages.extend(bag_messages);
        }
    }

    (converted, messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageDetails, RequiredProperty};
    use serde_json::{Value, json};

    const SAMPLE: ItemSpec = ItemSpec {
        required: Required::AnyOf(&["url", "data"]),
        props: &[CopyProp::renamed("data", "payload")],
        legends: true,
        ..ItemSpec::new("sample", ModelType::CsvItem)
    };

    fn run(raw: Value, options: &ConversionOptions) -> MemberResult {
        let member = CatalogMember::from_value(&raw, options.partial).expect("member shape");
        convert_item(&mut Converter::default(), &SAMPLE, &member, options)
    }

    #[test]
    fn any_of_requirement_lists_alternatives() {
        let result = run(json!({"name": "s", "type": "sample"}), &ConversionOptions::default());
        assert!(result.member.is_none());
        assert!(matches!(
            &result.messages[0].details,
            MessageDetails::MissingRequiredProp { property: RequiredProperty::AnyOf(names), required_type: None, .. }
                if names == &["url", "data"]
        ));

        let partial = run(json!({"type": "sample"}), &ConversionOptions::partial());
        assert_eq!(partial.member.map(Value::Object), Some(json!({"type": "sample"})));
    }

    #[test]
    fn unknown_fields_warn_and_copy_on_request() {
        let raw = json!({"name": "s", "type": "sample", "data": "x", "legendUrl": "l", "odd": 1});
        let plain = run(raw.clone(), &ConversionOptions::default());
        assert_eq!(
            plain.member.map(Value::Object),
            Some(json!({"type": "sample", "name": "s", "payload": "x", "legends": [{"url": "l"}]}))
        );
        assert_eq!(plain.messages.len(), 1);
        assert_eq!(plain.messages[0].path, vec!["s"]);

        let copying = ConversionOptions {
            copy_unknown_properties: true,
            ..ConversionOptions::default()
        };
        let copied = run(raw, &copying).member.expect("converts");
        assert_eq!(copied["odd"], json!(1));
    }
}
