//! Web Map Service items and capability groups.

use super::item::{Base, ItemSpec, Required, build_item, convert_item};
use super::props::{CopyProp, parse_float, number_value};
use crate::convert::Converter;
use crate::member::{CatalogMember, JsonObject, MemberResult};
use crate::message::{Message, ModelType};
use crate::options::ConversionOptions;
use crate::registry::TypeConverter;
use serde_json::Value;

const WMS_ITEM_PROPS: &[CopyProp] = &[
    CopyProp::same("layers"),
    CopyProp::same("styles"),
    CopyProp::translated("availableStyles", "availableStyles", available_styles),
    CopyProp::same("dimensions"),
    CopyProp::translated("availableDimensions", "availableDimensions", available_dimensions),
    CopyProp::same("parameters"),
    CopyProp::same("linkedWcsUrl"),
    CopyProp::same("linkedWcsCoverage"),
    CopyProp::same("chartColor"),
    CopyProp::same("getCapabilitiesUrl"),
    CopyProp::renamed("featureTimesProperty", "timeFilterPropertyName"),
    CopyProp::same("isGeoServer"),
    CopyProp::same("minScaleDenominator"),
    CopyProp::same("hideLayerAfterMinScaleDenominator"),
    CopyProp::same("maxRefreshIntervals"),
    CopyProp::same("leafletUpdateInterval"),
    CopyProp::translated("supportsColorScaleRange", "supportsColorScaleRange", color_scale_flag),
    CopyProp::translated("colorScaleMinimum", "colorScaleMinimum", color_scale_bound),
    CopyProp::translated("colorScaleMaximum", "colorScaleMaximum", color_scale_bound),
    CopyProp::renamed("disableUserChanges", "disableDimensionSelectors"),
];

const WMS_ITEM: ItemSpec = ItemSpec {
    required: Required::All(&["url", "layers"]),
    props: WMS_ITEM_PROPS,
    known: &["chartType"],
    imagery: true,
    legends: true,
    feature_info: true,
    tile_errors: true,
    ..ItemSpec::new("wms", ModelType::WmsItem)
};

const WMS_GROUP: ItemSpec = ItemSpec {
    base: Base::Group,
    required: Required::All(&["url"]),
    item_properties: Some(wms_item as TypeConverter),
    ..ItemSpec::new("wms-group", ModelType::WmsGroup)
};

/// `wms` -> `wms`.
pub fn wms_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    if !options.partial {
        if let Some(error) = WMS_ITEM.check_required(member) {
            return MemberResult::null(error);
        }
    }
    let (mut converted, mut messages) = build_item(converter, &WMS_ITEM, member, options);

    match member.get("chartType") {
        None => {}
        Some(Value::String(kind)) if kind == "momentPoints" => {
            converted.insert("chartType".to_string(), Value::String("momentPoints".to_string()));
        }
        Some(Value::String(kind)) if kind == "moment" => {
            converted.insert("chartType".to_string(), Value::String("momentLines".to_string()));
        }
        Some(other) => {
            let shown = other.as_str().map_or_else(|| other.to_string(), str::to_string);
            messages.push(
                Message::unknown_prop(ModelType::WmsItem, "chartType", &member.label())
                    .with_message(format!("Chart type \"{shown}\" is not supported")),
            );
        }
    }

    MemberResult::converted(converted, messages)
}

/// `wms-getCapabilities` -> `wms-group`.
pub fn wms_group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &WMS_GROUP, member, options)
}

/// `{ layer: [style] }` as `[{ layerName, styles }]`.
fn available_styles(value: &Value, _source: &JsonObject) -> Option<Value> {
    per_layer(value, "styles", |style| {
        let mut converted = JsonObject::new();
        for (v7, v8) in [("Name", "name"), ("Title", "title"), ("Abstract", "abstract")] {
            if let Some(field) = style.get(v7) {
                converted.insert(v8.to_string(), field.clone());
            }
        }
        if let Some(url) = style.get("legendUri") {
            let mut legend = JsonObject::new();
            legend.insert("url".to_string(), url.clone());
            converted.insert("legend".to_string(), Value::Object(legend));
        }
        converted
    })
}

/// `{ layer: [dimension] }` as `[{ layerName, dimensions }]`.
fn available_dimensions(value: &Value, _source: &JsonObject) -> Option<Value> {
    per_layer(value, "dimensions", |dimension| {
        let mut converted = JsonObject::new();
        for (v7, v8) in [
            ("name", "name"),
            ("options", "values"),
            ("units", "units"),
            ("unitSymbol", "unitSymbol"),
            ("default", "default"),
            ("multipleValues", "multipleValues"),
            ("nearestValue", "nearestValue"),
        ] {
            if let Some(field) = dimension.get(v7) {
                converted.insert(v8.to_string(), field.clone());
            }
        }
        converted
    })
}

fn per_layer(value: &Value, key: &str, convert: impl Fn(&Value) -> JsonObject) -> Option<Value> {
    let layers = value.as_object()?;
    Some(Value::Array(
        layers
            .iter()
            .map(|(layer_name, entries)| {
                let entries: Vec<Value> = entries
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|entry| Value::Object(convert(entry)))
                    .collect();
                let mut layer = JsonObject::new();
                layer.insert("layerName".to_string(), Value::String(layer_name.clone()));
                layer.insert(key.to_string(), Value::Array(entries));
                Value::Object(layer)
            })
            .collect(),
    ))
}

fn color_scale_flag(value: &Value, _source: &JsonObject) -> Option<Value> {
    match value {
        Value::String(text) => Some(Value::Bool(!text.is_empty())),
        Value::Bool(_) => Some(value.clone()),
        _ => None,
    }
}

fn color_scale_bound(value: &Value, _source: &JsonObject) -> Option<Value> {
    match value {
        Value::String(_) => parse_float(value).and_then(number_value),
        other => Some(other.clone()),
    }
}
