//! Field tables and helpers shared by the per-type converters.

use crate::convert::Converter;
use crate::member::{CatalogMember, JsonObject};
use crate::message::{Message, ModelType};
use crate::options::ConversionOptions;
use crate::registry::TypeConverter;
use serde_json::{Map, Number, Value, json};

/// Turns a v7 value (with its whole source member) into a v8 value.
/// `None` leaves the v8 field unset.
pub type Translate = fn(&Value, &JsonObject) -> Option<Value>;

/// One copy rule: v7 key, v8 key and an optional translation.
#[derive(Debug, Clone, Copy)]
pub struct CopyProp {
    pub v7: &'static str,
    pub v8: &'static str,
    pub translate: Option<Translate>,
}

impl CopyProp {
    pub const fn same(name: &'static str) -> Self {
        Self {
            v7: name,
            v8: name,
            translate: None,
        }
    }

    pub const fn renamed(v7: &'static str, v8: &'static str) -> Self {
        Self {
            v7,
            v8,
            translate: None,
        }
    }

    pub const fn translated(v7: &'static str, v8: &'static str, translate: Translate) -> Self {
        Self {
            v7,
            v8,
            translate: Some(translate),
        }
    }
}

pub const CATALOG_MEMBER_PROPS: &[CopyProp] = &[
    CopyProp::same("id"),
    CopyProp::same("shareKeys"),
    CopyProp::same("description"),
    CopyProp::same("info"),
    CopyProp::same("infoSectionOrder"),
    CopyProp::same("initialMessage"),
    CopyProp::same("shortReport"),
    CopyProp::translated("shortReportSections", "shortReportSections", short_report_sections),
    CopyProp::renamed("isShown", "show"),
    CopyProp::same("splitDirection"),
    CopyProp::same("url"),
    CopyProp::same("forceProxy"),
    CopyProp::same("cacheDuration"),
    CopyProp::translated("opacity", "opacity", float_value),
    CopyProp::same("chartDisclaimer"),
    CopyProp::translated("rectangle", "rectangle", rectangle),
    CopyProp::same("currentTime"),
    CopyProp::translated("dateFormat", "dateFormat", date_format),
    CopyProp::same("disablePreview"),
    CopyProp::same("hideSource"),
    CopyProp::translated("initialTimeSource", "initialTimeSource", initial_time_source),
    CopyProp::translated("initialTimeSource", "currentTime", time_source_as_current_time),
    CopyProp::same("dataCustodian"),
    CopyProp::renamed("isLegendVisible", "isOpenInWorkbench"),
    CopyProp::same("clipToRectangle"),
    CopyProp::translated("metadataUrl", "metadataUrls", metadata_urls),
    CopyProp::translated("dataUrl", "dataUrls", data_urls),
];

/// Added on top of [`CATALOG_MEMBER_PROPS`] for group-shaped members.
pub const CATALOG_GROUP_PROPS: &[CopyProp] = &[
    CopyProp::same("isOpen"),
    CopyProp::translated("blacklist", "blacklist", blacklist),
];

pub const IMAGERY_PROPS: &[CopyProp] = &[CopyProp::same("keepOnTop")];

pub const LEGEND_KEYS: &[&str] = &["legendUrl", "legendUrls"];

/// Known keys that are never copied as-is.
pub const CATALOG_MEMBER_IGNORE: &[&str] = &["name", "type", "parents", "isEnabled", "dataUrlType"];

/// Added on top of [`CATALOG_MEMBER_IGNORE`] for group-shaped members.
pub const CATALOG_GROUP_IGNORE: &[&str] = &["items", "preserveOrder"];

pub const TILE_ERROR_KEYS: &[&str] = &[
    "treat403AsError",
    "treat404AsError",
    "ignoreUnknownTileErrors",
    "tileErrorThresholdBeforeDisabling",
];

const FEATURE_INFO_TEMPLATE_KEYS: &[&str] = &["name", "template", "partials", "formats"];

/// Apply copy rules from `source` onto `destination`, in table order.
pub fn copy_props(source: &JsonObject, destination: &mut JsonObject, props: &[CopyProp]) {
    for prop in props {
        let Some(value) = source.get(prop.v7) else {
            continue;
        };
        let value = match prop.translate {
            Some(translate) => translate(value, source),
            None => Some(value.clone()),
        };
        if let Some(value) = value {
            destination.insert(prop.v8.to_string(), value);
        }
    }
}

/// Copy the named keys verbatim.
pub fn copy_keys(source: &JsonObject, destination: &mut JsonObject, keys: &[String]) {
    for key in keys {
        if let Some(value) = source.get(key) {
            destination.insert(key.clone(), value.clone());
        }
    }
}

/// Keys of `source` matched by neither a copy rule nor a known key, in
/// source order.
pub fn unknown_props(source: &JsonObject, tables: &[&[CopyProp]], known: &[&[&str]]) -> Vec<String> {
    source
        .keys()
        .filter(|key| {
            let in_tables = tables
                .iter()
                .any(|table| table.iter().any(|prop| prop.v7 == key.as_str()));
            let in_known = known.iter().any(|names| names.contains(&key.as_str()));
            !in_tables && !in_known
        })
        .cloned()
        .collect()
}

pub fn props_to_warnings(model_type: ModelType, props: &[String], label: &str) -> Vec<Message> {
    props
        .iter()
        .map(|prop| Message::unknown_prop(model_type, prop.as_str(), label))
        .collect()
}

/// v7 `featureInfoTemplate` (string or object) as a v8 template object.
pub fn feature_info_template(
    model_type: ModelType,
    label: &str,
    template: &Value,
) -> Option<(Value, Vec<Message>)> {
    match template {
        Value::String(text) => Some((json!({ "template": text }), Vec::new())),
        Value::Object(source) => {
            let unknown: Vec<String> = source
                .keys()
                .filter(|key| !FEATURE_INFO_TEMPLATE_KEYS.contains(&key.as_str()))
                .map(|key| format!("featureInfoTemplate.{key}"))
                .collect();
            let mut result = JsonObject::new();
            for key in FEATURE_INFO_TEMPLATE_KEYS {
                if let Some(value) = source.get(*key) {
                    result.insert(key.to_string(), value.clone());
                }
            }
            Some((
                Value::Object(result),
                props_to_warnings(model_type, &unknown, label),
            ))
        }
        _ => None,
    }
}

/// `legendUrl` and `legendUrls` collapsed into deduplicated v8 legends.
pub fn legends(source: &JsonObject) -> Option<Value> {
    let mut urls: Vec<&str> = Vec::new();
    let single = source.get("legendUrl").and_then(Value::as_str);
    let many = source
        .get("legendUrls")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    for url in single.into_iter().chain(many) {
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    if urls.is_empty() {
        return None;
    }
    Some(Value::Array(
        urls.into_iter().map(|url| json!({ "url": url })).collect(),
    ))
}

pub fn tile_error_handling_options(source: &JsonObject) -> Option<Value> {
    let mut options = JsonObject::new();
    for key in ["treat403AsError", "treat404AsError", "ignoreUnknownTileErrors"] {
        if let Some(flag) = source.get(key).filter(|value| value.is_boolean()) {
            options.insert(key.to_string(), flag.clone());
        }
    }
    if let Some(threshold) = source
        .get("tileErrorThresholdBeforeDisabling")
        .filter(|value| value.is_number())
    {
        options.insert("thresholdBeforeDisablingItem".to_string(), threshold.clone());
    }
    (!options.is_empty()).then_some(Value::Object(options))
}

/// Convert an embedded `itemProperties` bag with `convert`.
///
/// The bag is converted partially with id generation off and loses its
/// `name` and `type`. Messages are labelled `{label}.itemProperties` under
/// the owning member's label.
pub fn item_properties(
    converter: &mut Converter<'_>,
    item: &CatalogMember<'_>,
    convert: TypeConverter,
    options: &ConversionOptions,
) -> Option<(Option<JsonObject>, Vec<Message>)> {
    let bag = item.get_object("itemProperties")?;
    let label = item.label();

    let mut named = bag.clone();
    named.insert(
        "name".to_string(),
        Value::String(format!("{label}.itemProperties")),
    );
    let embedded = CatalogMember::with_type(&named, item.type_name());
    let result = convert(converter, &embedded, &options.for_item_properties());

    let properties = result.member.map(|mut properties| {
        properties.remove("name");
        properties.remove("type");
        properties
    });
    let messages = result
        .messages
        .into_iter()
        .map(|message| message.prefixed(&label))
        .collect();
    Some((properties, messages))
}

/// Leading decimal number of a string, or a JSON number.
pub fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_float_prefix(text),
        _ => None,
    }
}

fn parse_float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let candidate: &str = {
        let end = text
            .char_indices()
            .find(|&(_, c)| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
            .map_or(text.len(), |(index, _)| index);
        &text[..end]
    };
    let unsigned = candidate.trim_start_matches(['+', '-']);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .filter(|number| number.is_finite())
}

/// JSON number for `number`: whole values become integers.
pub fn number_value(number: f64) -> Option<Value> {
    if !number.is_finite() {
        return None;
    }
    if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        return Some(Value::from(number as i64));
    }
    Number::from_f64(number).map(Value::Number)
}

/// Numbers pass through unchanged, numeric strings are parsed.
pub fn float_value(value: &Value, _source: &JsonObject) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        other => parse_float(other).and_then(number_value),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn short_report_sections(value: &Value, _source: &JsonObject) -> Option<Value> {
    let sections = value.as_array().filter(|sections| !sections.is_empty())?;
    Some(Value::Array(
        sections
            .iter()
            .map(|section| {
                let mut converted = JsonObject::new();
                for (v7, v8) in [("name", "name"), ("content", "content"), ("isOpen", "show")] {
                    if let Some(field) = section.get(v7) {
                        converted.insert(v8.to_string(), field.clone());
                    }
                }
                Value::Object(converted)
            })
            .collect(),
    ))
}

/// `[west, south, east, north]` as a named rectangle. Zero is a valid corner.
pub fn rectangle(value: &Value, _source: &JsonObject) -> Option<Value> {
    let corners = value.as_array()?;
    let mut rectangle = JsonObject::new();
    for (key, corner) in ["west", "south", "east", "north"].iter().zip(corners) {
        if let Some(number) = parse_float(corner).and_then(number_value) {
            rectangle.insert(key.to_string(), number);
        }
    }
    Some(Value::Object(rectangle))
}

fn date_format(value: &Value, _source: &JsonObject) -> Option<Value> {
    ["timelineTic", "currentTime"]
        .iter()
        .find_map(|key| value.get(*key).filter(|format| !format.is_null()))
        .cloned()
}

fn initial_time_source(value: &Value, _source: &JsonObject) -> Option<Value> {
    let translated = match value.as_str()? {
        "present" => "now",
        "start" => "start",
        "end" => "stop",
        _ => return None,
    };
    Some(Value::String(translated.to_string()))
}

/// A v7 time source that is not a keyword is itself the current time.
fn time_source_as_current_time(value: &Value, _source: &JsonObject) -> Option<Value> {
    match value.as_str() {
        Some("present" | "start" | "end") => None,
        _ => Some(value.clone()),
    }
}

fn metadata_urls(value: &Value, _source: &JsonObject) -> Option<Value> {
    let url = value.as_str().filter(|url| !url.is_empty())?;
    Some(json!([{ "url": url }]))
}

fn data_urls(value: &Value, source: &JsonObject) -> Option<Value> {
    let url = value.as_str().filter(|url| !url.is_empty())?;
    let mut entry = Map::new();
    entry.insert("url".to_string(), Value::String(url.to_string()));
    if let Some(kind) = source.get("dataUrlType") {
        entry.insert("type".to_string(), kind.clone());
    }
    Some(Value::Array(vec![Value::Object(entry)]))
}

/// v7 `{ name: include }` map as the list of included names.
fn blacklist(value: &Value, _source: &JsonObject) -> Option<Value> {
    let entries = value.as_object()?;
    Some(Value::Array(
        entries
            .iter()
            .filter(|(_, include)| is_truthy(include))
            .map(|(name, _)| Value::String(name.clone()))
            .collect(),
    ))
}
