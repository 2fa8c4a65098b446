//! Types with little or no translation beyond copying fields.

use super::item::{Base, ItemSpec, Required, build_item, convert_item};
use super::props::CopyProp;
use crate::convert::Converter;
use crate::member::{CatalogMember, JsonObject, MemberResult};
use crate::message::{Message, ModelType, RequiredProperty};
use crate::options::ConversionOptions;
use crate::registry::TypeConverter;
use serde_json::Value;

const URL: &[CopyProp] = &[CopyProp::same("url")];

const SOS_ITEM: ItemSpec = ItemSpec {
    required: Required::All(&["url"]),
    props: &[
        CopyProp::same("url"),
        CopyProp::same("proceduresName"),
        CopyProp::same("observablePropertiesName"),
        CopyProp::same("startDate"),
        CopyProp::same("filterByProcedures"),
        CopyProp::same("stationIdWhitelist"),
        CopyProp::same("procedures"),
        CopyProp::same("observableProperties"),
    ],
    feature_info: true,
    ..ItemSpec::new("sos", ModelType::SosItem)
};

const GEOJSON_ITEM: ItemSpec = ItemSpec {
    props: URL,
    known: &["data"],
    legends: true,
    feature_info: true,
    ..ItemSpec::new("geojson", ModelType::GeoJsonItem)
};

const WPS_ITEM: ItemSpec = ItemSpec {
    required: Required::All(&["url"]),
    props: &[
        CopyProp::same("url"),
        CopyProp::same("identifier"),
        CopyProp::same("executeWithHttpGet"),
    ],
    // v8 has no template for processes; accepted and dropped.
    known: &["featureInfoTemplate"],
    ..ItemSpec::new("wps", ModelType::WpsItem)
};

const WPS_RESULT_ITEM: ItemSpec = ItemSpec {
    props: &[
        CopyProp::same("wpsResponseUrl"),
        CopyProp::same("wpsResponse"),
        CopyProp::same("parameters"),
    ],
    known: &["featureInfoTemplate"],
    ..ItemSpec::new("wps-result", ModelType::WpsResultItem)
};

const WPS_GROUP: ItemSpec = ItemSpec {
    required: Required::All(&["url"]),
    props: &[CopyProp::same("isOpen")],
    item_properties: Some(wps_item as TypeConverter),
    ..ItemSpec::new("wps-getCapabilities", ModelType::WpsGroup)
};

const CARTO_ITEM: ItemSpec = ItemSpec {
    props: &[
        CopyProp::same("config"),
        CopyProp::same("auth_token"),
        CopyProp::same("minimumLevel"),
        CopyProp::same("maximumLevel"),
        CopyProp::same("attribution"),
    ],
    imagery: true,
    legends: true,
    ..ItemSpec::new("carto", ModelType::CartoMapItem)
};

const MVT_ITEM: ItemSpec = ItemSpec {
    props: &[
        CopyProp::same("lineColor"),
        CopyProp::same("fillColor"),
        CopyProp::same("layer"),
        CopyProp::same("idProperty"),
        CopyProp::same("nameProperty"),
        CopyProp::same("maximumNativeZoom"),
        CopyProp::same("maximumZoom"),
        CopyProp::same("minimumZoom"),
    ],
    imagery: true,
    legends: true,
    ..ItemSpec::new("mvt", ModelType::MapboxVectorTileItem)
};

const KML_ITEM: ItemSpec = ItemSpec {
    required: Required::All(&["url"]),
    legends: true,
    ..ItemSpec::new("kml", ModelType::KmlItem)
};

const CSW_GROUP: ItemSpec = ItemSpec {
    required: Required::All(&["url"]),
    props: &[CopyProp::same("url"), CopyProp::same("domainSpecification")],
    ..ItemSpec::new("csw-group", ModelType::CswGroup)
};

const WFS_GROUP: ItemSpec = ItemSpec {
    base: Base::Group,
    required: Required::All(&["url"]),
    props: URL,
    ..ItemSpec::new("wfs-group", ModelType::WfsGroup)
};

const SOCRATA_GROUP: ItemSpec = ItemSpec {
    base: Base::Group,
    required: Required::All(&["url"]),
    props: &[
        CopyProp::same("url"),
        CopyProp::translated("filterQuery", "filterQuery", filter_query),
    ],
    known: &["groupBy"],
    ..ItemSpec::new("socrata-group", ModelType::SocrataGroup)
};

/// `sos` -> `sos`.
pub fn sos_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &SOS_ITEM, member, options)
}

/// `geojson` -> `geojson`. Needs a `url` string, or `data` as a string or
/// an object.
pub fn geojson_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    let data = member.get("data").filter(|data| data.is_string() || data.is_object());
    if !options.partial && data.is_none() && !member.has_str("url") {
        return MemberResult::null(Message::missing_required_prop(
            ModelType::GeoJsonItem,
            RequiredProperty::from(["url", "data"].as_slice()),
            None,
            &member.label(),
        ));
    }

    let (mut converted, messages) = build_item(converter, &GEOJSON_ITEM, member, options);
    match data {
        Some(Value::Object(data)) => {
            converted.insert("geoJsonData".to_string(), Value::Object(data.clone()));
        }
        Some(Value::String(data)) => {
            converted.insert("geoJsonString".to_string(), Value::String(data.clone()));
        }
        _ => {}
    }
    MemberResult::converted(converted, messages)
}

/// `wps` -> `wps`.
pub fn wps_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &WPS_ITEM, member, options)
}

/// `wps-result` -> `wps-result`.
pub fn wps_result_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &WPS_RESULT_ITEM, member, options)
}

/// `wps-getCapabilities` -> `wps-getCapabilities`, with `itemProperties`
/// converted as a `wps` item.
pub fn wps_group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &WPS_GROUP, member, options)
}

pub fn carto_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &CARTO_ITEM, member, options)
}

pub fn mvt_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &MVT_ITEM, member, options)
}

pub fn kml_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &KML_ITEM, member, options)
}

/// `csw` -> `csw-group`.
pub fn csw_group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &CSW_GROUP, member, options)
}

/// `wfs-getCapabilities` -> `wfs-group`.
pub fn wfs_group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &WFS_GROUP, member, options)
}

/// `socrata` -> `socrata-group`.
pub fn socrata_group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &SOCRATA_GROUP, member, options)
}

/// `["key=value", ...]` as `{ key: value }`. Later keys win; an entry
/// without `=` maps to null.
fn filter_query(value: &Value, _source: &JsonObject) -> Option<Value> {
    let entries = value.as_array()?;
    let mut query = JsonObject::new();
    for entry in entries.iter().filter_map(Value::as_str) {
        let mut parts = entry.split('=');
        let key = parts.next().unwrap_or_default();
        let value = parts
            .next()
            .map_or(Value::Null, |value| Value::String(value.to_string()));
        query.insert(key.to_string(), value);
    }
    Some(Value::Object(query))
}

#[cfg(test)]
mod tests {
    use crate::convert::Converter;
    use crate::message::{MessageDetails, ModelType, RequiredProperty};
    use crate::options::ConversionOptions;
    use serde_json::{Value, json};

    fn no_ids() -> ConversionOptions {
        ConversionOptions {
            generate_ids: false,
            ..ConversionOptions::default()
        }
    }

    fn convert(raw: Value) -> crate::member::MemberResult {
        Converter::default().convert_member(&raw, &no_ids())
    }

    #[test]
    fn geojson_data_shapes() {
        let object = convert(json!({
            "name": "Points",
            "type": "geojson",
            "data": {"type": "FeatureCollection", "features": []},
        }));
        assert!(object.messages.is_empty());
        assert_eq!(
            object.member.map(Value::Object),
            Some(json!({
                "type": "geojson",
                "name": "Points",
                "geoJsonData": {"type": "FeatureCollection", "features": []},
            }))
        );

        let text = convert(json!({"name": "Points", "type": "geojson", "data": "{}"}));
        assert_eq!(text.member.expect("string data")["geoJsonString"], json!("{}"));
    }

    #[test]
    fn geojson_needs_url_or_data() {
        let result = convert(json!({"name": "Points", "type": "geojson", "data": 4}));
        assert!(result.member.is_none());
        assert!(matches!(
            &result.messages[0].details,
            MessageDetails::MissingRequiredProp {
                model_type: ModelType::GeoJsonItem,
                property: RequiredProperty::AnyOf(names),
                required_type: None,
            } if names == &["url", "data"]
        ));
    }

    #[test]
    fn socrata_filter_query_becomes_object() {
        let result = convert(json!({
            "name": "Open data",
            "type": "socrata",
            "url": "http://socrata",
            "filterQuery": ["category=Transport", "limit=5"],
            "groupBy": "category",
            "isOpen": true,
        }));
        assert!(result.messages.is_empty());
        assert_eq!(
            result.member.map(Value::Object),
            Some(json!({
                "type": "socrata-group",
                "name": "Open data",
                "url": "http://socrata",
                "isOpen": true,
                "filterQuery": {"category": "Transport", "limit": "5"},
            }))
        );
    }

    #[test]
    fn renamed_types() {
        for (v7, v8) in [
            ("csw", "csw-group"),
            ("wfs-getCapabilities", "wfs-group"),
            ("wps-getCapabilities", "wps-getCapabilities"),
            ("kml", "kml"),
            ("sos", "sos"),
        ] {
            let result = convert(json!({"name": "x", "type": v7, "url": "http://x"}));
            assert_eq!(result.member.expect("converts")["type"], json!(v8), "{v7}");
        }
    }

    #[test]
    fn wps_template_is_accepted_but_dropped() {
        let result = convert(json!({
            "name": "Process",
            "type": "wps",
            "url": "http://wps",
            "identifier": "buffer",
            "featureInfoTemplate": "<b>x</b>",
        }));
        assert!(result.messages.is_empty());
        let member = result.member.expect("wps converts");
        assert_eq!(member["identifier"], json!("buffer"));
        assert!(!member.contains_key("featureInfoTemplate"));
    }

    #[test]
    fn mvt_copies_style_and_imagery() {
        let result = convert(json!({
            "name": "Tiles",
            "type": "mvt",
            "url": "http://tiles",
            "layer": "roads",
            "fillColor": "#fff",
            "keepOnTop": false,
            "legendUrl": "http://legend",
        }));
        assert!(result.messages.is_empty());
        assert_eq!(
            result.member.map(Value::Object),
            Some(json!({
                "type": "mvt",
                "name": "Tiles",
                "url": "http://tiles",
                "keepOnTop": false,
                "fillColor": "#fff",
                "layer": "roads",
                "legends": [{"url": "http://legend"}],
            }))
        );
    }
}
