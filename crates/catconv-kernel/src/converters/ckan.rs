//! CKAN groups and resources.
//!
//! v7 spread resource handling over per-format fields
//! (`wmsResourceFormat`, `csvResourceFormat`, ...). v8 condenses them into a
//! `supportedResourceFormats` list.

use super::item::{ItemSpec, Required, convert_item};
use super::props::{
    CATALOG_MEMBER_IGNORE, CATALOG_MEMBER_PROPS, CopyProp, copy_keys, copy_props, item_properties,
    props_to_warnings, rectangle, unknown_props,
};
use super::{csv, esri, other, wms};
use crate::convert::Converter;
use crate::member::{CatalogMember, JsonObject, MemberResult};
use crate::message::{Message, ModelType};
use crate::options::ConversionOptions;
use crate::registry::TypeConverter;
use serde_json::{Value, json};

const CKAN_GROUP: ItemSpec = ItemSpec {
    required: Required::All(&["url"]),
    props: &[
        CopyProp::same("url"),
        CopyProp::same("filterQuery"),
        CopyProp::same("groupBy"),
        CopyProp::same("useCombinationNameWhereMultipleResources"),
        CopyProp::translated("ungroupedTitle", "ungroupedTitle", non_empty),
    ],
    known: &["esriMapServerResourceFormat", "wmsParameters"],
    ..ItemSpec::new("ckan-group", ModelType::CkanGroup)
};

/// Resource props copied onto a `ckan-item` reference.
const CKAN_ITEM_PROPS: &[CopyProp] = &[
    CopyProp::same("id"),
    CopyProp::same("name"),
    CopyProp::same("url"),
    CopyProp::same("forceProxy"),
    CopyProp::same("cacheDuration"),
    CopyProp::same("dataCustodian"),
    CopyProp::translated("rectangle", "rectangle", rectangle),
    CopyProp::same("disablePreview"),
    CopyProp::same("datasetId"),
    CopyProp::same("resourceId"),
];

const CKAN_ITEM_KNOWN: &[&str] = &[
    "allowAnyResourceIfResourceIdNotFound",
    "itemProperties",
];

/// How a resource format maps onto v8, in precedence order.
struct ResourceFormat {
    v7: &'static str,
    id: &'static str,
    v8_type: &'static str,
    item_properties: Option<TypeConverter>,
}

const RESOURCE_FORMATS: &[ResourceFormat] = &[
    ResourceFormat {
        v7: "esriFeatureServerResourceFormat",
        id: "ArcGIS FeatureServer",
        v8_type: "esri-featureServer",
        item_properties: Some(esri::feature_server_item as TypeConverter),
    },
    ResourceFormat {
        v7: "wmsResourceFormat",
        id: "WMS",
        v8_type: "wms",
        item_properties: Some(wms::wms_item as TypeConverter),
    },
    ResourceFormat {
        v7: "wfsResourceFormat",
        id: "WFS",
        v8_type: "wfs",
        item_properties: None,
    },
    ResourceFormat {
        v7: "kmlResourceFormat",
        id: "Kml",
        v8_type: "kml",
        item_properties: Some(other::kml_item as TypeConverter),
    },
    ResourceFormat {
        v7: "csvResourceFormat",
        id: "CSV",
        v8_type: "csv",
        item_properties: Some(csv::csv_item as TypeConverter),
    },
    ResourceFormat {
        v7: "esriMapServerResourceFormat",
        id: "ArcGIS MapServer",
        v8_type: "esri-mapServer",
        item_properties: Some(esri::map_server_item as TypeConverter),
    },
    ResourceFormat {
        v7: "geoJsonResourceFormat",
        id: "GeoJson",
        v8_type: "geojson",
        item_properties: Some(other::geojson_item as TypeConverter),
    },
    ResourceFormat {
        v7: "czmlResourceFormat",
        id: "Czml",
        v8_type: "czml",
        item_properties: None,
    },
];

/// `ckan` -> `ckan-group`.
pub fn ckan_group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    let mut result = convert_item(converter, &CKAN_GROUP, member, options);
    if let Some(converted) = result.member.as_mut() {
        let mut formats = Vec::new();
        if let Some(pattern) = member.get_str("esriMapServerResourceFormat") {
            formats.push(json!({"id": "ArcGIS FeatureServer", "formatRegex": pattern}));
        }
        if let Some(parameters) = member.get("wmsParameters").filter(|p| p.is_object()) {
            formats.push(json!({
                "id": "WMS",
                "definition": {"type": "wms", "parameters": parameters},
            }));
        }
        converted.insert("supportedResourceFormats".to_string(), Value::Array(formats));
    }
    result
}

/// `ckan-resource` -> `ckan-item`.
///
/// The first resource format present selects the v8 resource definition and
/// the converter for `itemProperties`.
pub fn ckan_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    let label = member.label();
    if !options.partial && !member.has_str("url") {
        return MemberResult::null(Message::missing_required_prop(
            ModelType::CkanItem,
            "url",
            Some("string"),
            &label,
        ));
    }

    let raw = member.raw();
    let format_keys: Vec<&str> = RESOURCE_FORMATS.iter().map(|format| format.v7).collect();
    let unknown = unknown_props(
        raw,
        &[CKAN_ITEM_PROPS, CATALOG_MEMBER_PROPS],
        &[CATALOG_MEMBER_IGNORE, CKAN_ITEM_KNOWN, format_keys.as_slice()],
    );
    let mut messages = props_to_warnings(ModelType::CkanItem, &unknown, &label);

    let mut converted = member.v8_member("ckan-item");
    copy_props(raw, &mut converted, CKAN_ITEM_PROPS);
    if options.copy_unknown_properties {
        copy_keys(raw, &mut converted, &unknown);
    }

    let mut formats = Vec::new();
    if let Some((format, pattern)) = RESOURCE_FORMATS
        .iter()
        .find_map(|format| member.get_str(format.v7).map(|pattern| (format, pattern)))
    {
        formats.push(json!({
            "id": format.id,
            "formatRegex": pattern,
            "definition": {"type": format.v8_type},
        }));
        match format.item_properties {
            Some(convert) => {
                if let Some((properties, bag_messages)) =
                    item_properties(converter, member, convert, options)
                {
                    if let Some(properties) = properties {
                        converted.insert("itemProperties".to_string(), Value::Object(properties));
                    }
                    messages.extend(bag_messages);
                }
            }
            None if member.get_object("itemProperties").is_some() => {
                let property = format!("itemProperties ({})", format.id);
                messages.push(
                    Message::unknown_prop(ModelType::CkanItem, property.as_str(), &property)
                        .with_message(format!("{} itemProperties is not supported", format.id))
                        .prefixed(&label),
                );
            }
            None => {}
        }
    }

    if let Some(bag) = member.get_object("itemProperties") {
        let mut extra = JsonObject::new();
        let leftover: Vec<CopyProp> = CATALOG_MEMBER_PROPS
            .iter()
            .filter(|prop| {
                !CKAN_ITEM_PROPS.iter().any(|own| own.v7 == prop.v7)
                    && !CKAN_ITEM_KNOWN.contains(&prop.v7)
                    && !format_keys.contains(&prop.v7)
                    && !CATALOG_MEMBER_IGNORE.contains(&prop.v7)
            })
            .copied()
            .collect();
        copy_props(bag, &mut extra, &leftover);

        let properties = converted
            .entry("itemProperties")
            .or_insert_with(|| Value::Object(JsonObject::new()));
        if let Value::Object(properties) = properties {
            properties.extend(extra);
        }
    }

    converted.insert("supportedResourceFormats".to_string(), Value::Array(formats));
    MemberResult::converted(converted, messages)
}

fn non_empty(value: &Value, _source: &JsonObject) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        other => Some(other.clone()),
    }
}
