//! ArcGIS map server, feature server and catalog groups.

use super::item::{Base, ItemSpec, Required, convert_item};
use super::props::CopyProp;
use crate::convert::Converter;
use crate::member::{CatalogMember, MemberResult};
use crate::message::ModelType;
use crate::options::ConversionOptions;

const URL: &[CopyProp] = &[CopyProp::same("url")];

const MAP_SERVER_ITEM: ItemSpec = ItemSpec {
    required: Required::All(&["url"]),
    props: &[
        CopyProp::same("url"),
        CopyProp::same("layers"),
        CopyProp::same("maximumScale"),
        CopyProp::same("allowFeaturePicking"),
        CopyProp::same("parameters"),
        CopyProp::same("tokenUrl"),
        CopyProp::same("showTilesAfterMessage"),
        CopyProp::same("maximumScaleBeforeMessage"),
    ],
    imagery: true,
    legends: true,
    feature_info: true,
    ..ItemSpec::new("esri-mapServer", ModelType::EsriMapServerItem)
};

const FEATURE_SERVER_ITEM: ItemSpec = ItemSpec {
    required: Required::All(&["url"]),
    props: &[
        CopyProp::same("url"),
        CopyProp::same("useStyleInformationFromService"),
    ],
    feature_info: true,
    ..ItemSpec::new("esri-featureServer", ModelType::EsriFeatureServerItem)
};

const CATALOG_GROUP: ItemSpec = ItemSpec {
    base: Base::Group,
    required: Required::All(&["url"]),
    props: URL,
    tile_errors: true,
    ..ItemSpec::new("esri-group", ModelType::EsriCatalogGroup)
};

const MAP_SERVER_GROUP: ItemSpec = ItemSpec {
    base: Base::Group,
    required: Required::All(&["url"]),
    props: URL,
    ..ItemSpec::new("esri-mapServer-group", ModelType::EsriMapServerGroup)
};

/// `esri-mapServer` -> `esri-mapServer`.
pub fn map_server_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &MAP_SERVER_ITEM, member, options)
}

/// `esri-featureServer` -> `esri-featureServer`.
pub fn feature_server_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &FEATURE_SERVER_ITEM, member, options)
}

/// `esri-group` -> `esri-group`. Embedded `itemProperties` have no v8
/// counterpart and are reported as unknown.
pub fn catalog_group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &CATALOG_GROUP, member, options)
}

/// `esri-mapServer-group` -> `esri-mapServer-group`.
pub fn map_server_group(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    convert_item(converter, &MAP_SERVER_GROUP, member, options)
}

#[cfg(test)]
mod tests {
    use crate::convert::Converter;
    use crate::message::{MessageDetails, ModelType};
    use crate::options::ConversionOptions;
    use serde_json::{Value, json};

    fn no_ids() -> ConversionOptions {
        ConversionOptions {
            generate_ids: false,
            ..ConversionOptions::default()
        }
    }

    #[test]
    fn map_server_keeps_imagery_and_legends() {
        let raw = json!({
            "name": "Roads",
            "type": "esri-mapServer",
            "url": "http://arcgis/MapServer",
            "layers": "0,1",
            "keepOnTop": true,
            "legendUrls": ["http://legend"],
            "featureInfoTemplate": "<b>{{NAME}}</b>",
        });
        let result = Converter::default().convert_member(&raw, &no_ids());
        assert!(result.messages.is_empty());
        assert_eq!(
            result.member.map(Value::Object),
            Some(json!({
                "type": "esri-mapServer",
                "name": "Roads",
                "url": "http://arcgis/MapServer",
                "layers": "0,1",
                "keepOnTop": true,
                "featureInfoTemplate": {"template": "<b>{{NAME}}</b>"},
                "legends": [{"url": "http://legend"}],
            }))
        );
    }

    #[test]
    fn esri_group_item_properties_are_unknown() {
        let raw = json!({
            "name": "Portal",
            "type": "esri-group",
            "url": "http://arcgis",
            "itemProperties": {"opacity": 1},
            "treat403AsError": true,
        });
        let result = Converter::default().convert_member(&raw, &no_ids());
        let member = result.member.expect("esri group converts");
        assert_eq!(member["tileErrorHandlingOptions"], json!({"treat403AsError": true}));
        assert!(!member.contains_key("itemProperties"));
        assert_eq!(
            result.messages[0].details,
            MessageDetails::UnknownProp {
                model_type: ModelType::EsriCatalogGroup,
                property: "itemProperties".to_string(),
            }
        );
    }

    #[test]
    fn groups_require_url() {
        for type_name in ["esri-group", "esri-mapServer-group", "esri-featureServer"] {
            let result = Converter::default()
                .convert_member(&json!({"name": "x", "type": type_name}), &no_ids());
            assert!(result.member.is_none(), "{type_name} converted without url");
        }
    }
}
