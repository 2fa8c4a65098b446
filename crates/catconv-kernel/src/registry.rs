//! Type-converter registry.
//!
//! Maps a v7 `type` discriminator to the function converting that shape.
//! The built-in table is the single authority for which v7 types convert;
//! callers needing a different set build their own [`Registry`].

use crate::convert::Converter;
use crate::converters;
use crate::error::KernelError;
use crate::member::{CatalogMember, MemberResult};
use crate::message::ModelType;
use crate::options::ConversionOptions;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Converts one validated member. Recursion goes back through `Converter`.
pub type TypeConverter =
    fn(&mut Converter<'_>, &CatalogMember<'_>, &ConversionOptions) -> MemberResult;

#[derive(Debug, Clone, Copy)]
pub struct ConverterEntry {
    pub model_type: ModelType,
    pub convert: TypeConverter,
}

/// Built-in v7 type -> converter mapping.
pub const BUILTIN_CONVERTERS: &[(&str, ModelType, TypeConverter)] = &[
    ("group", ModelType::Group, converters::group::group),
    ("wms", ModelType::WmsItem, converters::wms::wms_item),
    ("wms-getCapabilities", ModelType::WmsGroup, converters::wms::wms_group),
    ("csv", ModelType::CsvItem, converters::csv::csv_item),
    ("sos", ModelType::SosItem, converters::other::sos_item),
    (
        "esri-mapServer",
        ModelType::EsriMapServerItem,
        converters::esri::map_server_item,
    ),
    ("esri-group", ModelType::EsriCatalogGroup, converters::esri::catalog_group),
    (
        "esri-mapServer-group",
        ModelType::EsriMapServerGroup,
        converters::esri::map_server_group,
    ),
    (
        "esri-featureServer",
        ModelType::EsriFeatureServerItem,
        converters::esri::feature_server_item,
    ),
    ("ckan", ModelType::CkanGroup, converters::ckan::ckan_group),
    ("ckan-resource", ModelType::CkanItem, converters::ckan::ckan_item),
    ("geojson", ModelType::GeoJsonItem, converters::other::geojson_item),
    ("wps", ModelType::WpsItem, converters::other::wps_item),
    ("wps-result", ModelType::WpsResultItem, converters::other::wps_result_item),
    ("wps-getCapabilities", ModelType::WpsGroup, converters::other::wps_group),
    ("carto", ModelType::CartoMapItem, converters::other::carto_item),
    ("mvt", ModelType::MapboxVectorTileItem, converters::other::mvt_item),
    ("kml", ModelType::KmlItem, converters::other::kml_item),
    ("csw", ModelType::CswGroup, converters::other::csw_group),
    ("wfs-getCapabilities", ModelType::WfsGroup, converters::other::wfs_group),
    ("socrata", ModelType::SocrataGroup, converters::other::socrata_group),
];

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| {
    let mut registry = Registry::new();
    for (type_name, model_type, convert) in BUILTIN_CONVERTERS {
        registry.insert(type_name, *model_type, *convert);
    }
    registry
});

#[derive(Debug, Clone, Default)]
pub struct Registry {
    converters: BTreeMap<String, ConverterEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry of built-in converters.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Register a converter. Each discriminator may be registered once.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        model_type: ModelType,
        convert: TypeConverter,
    ) -> Result<(), KernelError> {
        let type_name = type_name.into();
        if self.converters.contains_key(&type_name) {
            return Err(KernelError::DuplicateConverter(type_name));
        }
        self.insert(&type_name, model_type, convert);
        Ok(())
    }

    /// Builder form of [`Registry::register`].
    pub fn with(
        mut self,
        type_name: impl Into<String>,
        model_type: ModelType,
        convert: TypeConverter,
    ) -> Result<Self, KernelError> {
        self.register(type_name, model_type, convert)?;
        Ok(self)
    }

    fn insert(&mut self, type_name: &str, model_type: ModelType, convert: TypeConverter) {
        self.converters.insert(
            type_name.to_string(),
            ConverterEntry {
                model_type,
                convert,
            },
        );
    }

    pub fn get(&self, type_name: &str) -> Option<&ConverterEntry> {
        self.converters.get(type_name)
    }

    /// Registered discriminators in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRow<'a> {
    pub v7_type: &'a str,
    pub model_type: ModelType,
}

/// Deterministic JSON rendering of a registry, as printed by `catconv types`.
pub fn registry_json(registry: &Registry) -> Value {
    let rows: Vec<RegistryRow<'_>> = registry
        .converters
        .iter()
        .map(|(v7_type, entry)| RegistryRow {
            v7_type,
            model_type: entry.model_type,
        })
        .collect();
    json!({
        "schema": 1,
        "registryKind": "catconv.type_registry.v1",
        "converters": rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(
        _converter: &mut Converter<'_>,
        _member: &CatalogMember<'_>,
        _options: &ConversionOptions,
    ) -> MemberResult {
        MemberResult::default()
    }

    #[test]
    fn builtin_registry_covers_required_types() {
        let registry = Registry::builtin();
        for type_name in [
            "group",
            "wms",
            "wms-getCapabilities",
            "csv",
            "sos",
            "esri-mapServer",
            "esri-group",
            "esri-mapServer-group",
            "esri-featureServer",
            "ckan",
            "ckan-resource",
            "geojson",
            "wps",
            "wps-result",
            "carto",
            "mvt",
            "kml",
            "csw",
            "wfs-getCapabilities",
            "socrata",
        ] {
            assert!(registry.get(type_name).is_some(), "missing converter: {type_name}");
        }
        assert_eq!(registry.len(), BUILTIN_CONVERTERS.len());
        assert!(registry.get("FAKE").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::new();
        registry
            .register("thing", ModelType::Member, noop)
            .expect("first registration");
        assert_eq!(
            registry.register("thing", ModelType::Group, noop),
            Err(KernelError::DuplicateConverter("thing".to_string()))
        );
        assert_eq!(registry.get("thing").map(|entry| entry.model_type), Some(ModelType::Member));
    }

    #[test]
    fn builder_registers_in_sorted_order() {
        let registry = Registry::new()
            .with("b", ModelType::Member, noop)
            .and_then(|registry| registry.with("a", ModelType::Group, noop))
            .expect("distinct types register");
        assert_eq!(registry.types().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn registry_json_surface_is_deterministic() {
        let first = registry_json(Registry::builtin());
        let second = registry_json(Registry::builtin());
        assert_eq!(first, second);
        assert_eq!(
            first.get("registryKind").and_then(Value::as_str),
            Some("catconv.type_registry.v1")
        );
        let rows = first["converters"].as_array().expect("converter rows");
        assert!(rows.iter().any(|row| row["v7Type"] == "ckan-resource"
            && row["modelType"] == "CkanCatalogItem"));
    }
}
