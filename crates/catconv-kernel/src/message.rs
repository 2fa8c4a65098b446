//! Conversion diagnostics.
//!
//! Every problem met while converting is a [`Message`]: a severity, a human
//! readable text, the label path of the node that produced it and a typed
//! [`MessageDetails`] payload. Enclosing conversions prepend their own label
//! to the path as results bubble up, so a finished path reads root-to-leaf.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a conversion message.
///
/// `Error` means the affected node was dropped from its parent. `Warning`
/// means the node converted and the message is advisory only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// The v8 model a diagnostic refers to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ModelType {
    #[serde(rename = "CatalogMember")]
    Member,
    #[serde(rename = "CatalogGroup")]
    Group,
    #[serde(rename = "WebMapServiceCatalogItem")]
    WmsItem,
    #[serde(rename = "WebMapServiceCatalogGroup")]
    WmsGroup,
    #[serde(rename = "CsvCatalogItem")]
    CsvItem,
    #[serde(rename = "SensorObservationServiceCatalogItem")]
    SosItem,
    #[serde(rename = "EsriMapServerCatalogItem")]
    EsriMapServerItem,
    #[serde(rename = "EsriMapServerCatalogGroup")]
    EsriMapServerGroup,
    #[serde(rename = "EsriCatalogGroup")]
    EsriCatalogGroup,
    #[serde(rename = "EsriFeatureServerCatalogItem")]
    EsriFeatureServerItem,
    #[serde(rename = "CkanCatalogGroup")]
    CkanGroup,
    #[serde(rename = "CkanCatalogItem")]
    CkanItem,
    #[serde(rename = "GeoJsonCatalogItem")]
    GeoJsonItem,
    #[serde(rename = "WebProcessingServiceCatalogItem")]
    WpsItem,
    #[serde(rename = "WebProcessingServiceCatalogGroup")]
    WpsGroup,
    #[serde(rename = "WebProcessingServiceCatalogFunctionResult")]
    WpsResultItem,
    #[serde(rename = "CartoMapCatalogItem")]
    CartoMapItem,
    #[serde(rename = "MapboxVectorTileCatalogItem")]
    MapboxVectorTileItem,
    #[serde(rename = "KmlCatalogItem")]
    KmlItem,
    #[serde(rename = "CswCatalogGroup")]
    CswGroup,
    #[serde(rename = "WebFeatureServiceCatalogGroup")]
    WfsGroup,
    #[serde(rename = "SocrataCatalogGroup")]
    SocrataGroup,
    #[serde(rename = "Share")]
    Share,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "CatalogMember",
            Self::Group => "CatalogGroup",
            Self::WmsItem => "WebMapServiceCatalogItem",
            Self::WmsGroup => "WebMapServiceCatalogGroup",
            Self::CsvItem => "CsvCatalogItem",
            Self::SosItem => "SensorObservationServiceCatalogItem",
            Self::EsriMapServerItem => "EsriMapServerCatalogItem",
            Self::EsriMapServerGroup => "EsriMapServerCatalogGroup",
            Self::EsriCatalogGroup => "EsriCatalogGroup",
            Self::EsriFeatureServerItem => "EsriFeatureServerCatalogItem",
            Self::CkanGroup => "CkanCatalogGroup",
            Self::CkanItem => "CkanCatalogItem",
            Self::GeoJsonItem => "GeoJsonCatalogItem",
            Self::WpsItem => "WebProcessingServiceCatalogItem",
            Self::WpsGroup => "WebProcessingServiceCatalogGroup",
            Self::WpsResultItem => "WebProcessingServiceCatalogFunctionResult",
            Self::CartoMapItem => "CartoMapCatalogItem",
            Self::MapboxVectorTileItem => "MapboxVectorTileCatalogItem",
            Self::KmlItem => "KmlCatalogItem",
            Self::CswGroup => "CswCatalogGroup",
            Self::WfsGroup => "WebFeatureServiceCatalogGroup",
            Self::SocrataGroup => "SocrataCatalogGroup",
            Self::Share => "Share",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The property (or alternative properties) a model requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiredProperty {
    One(String),
    AnyOf(Vec<String>),
}

impl RequiredProperty {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::One(name) => vec![name.as_str()],
            Self::AnyOf(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for RequiredProperty {
    fn from(name: &str) -> Self {
        Self::One(name.to_string())
    }
}

impl From<&[&str]> for RequiredProperty {
    fn from(names: &[&str]) -> Self {
        Self::AnyOf(names.iter().map(|name| name.to_string()).collect())
    }
}

impl fmt::Display for RequiredProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.names().join("\" or \""))
    }
}

/// Kind-specific payload of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum MessageDetails {
    /// A field the converter does not know was encountered.
    UnknownProp {
        model_type: ModelType,
        property: String,
    },
    /// A field required to convert the node is absent or has the wrong type.
    MissingRequiredProp {
        model_type: ModelType,
        property: RequiredProperty,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        required_type: Option<String>,
    },
    /// No converter is registered for the node's `type`.
    UnknownType {
        #[serde(rename = "type")]
        type_name: String,
    },
    /// The whole input was not a JSON object.
    InputNotPlainObject,
}

impl MessageDetails {
    /// Stable name of the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownProp { .. } => "UnknownProp",
            Self::MissingRequiredProp { .. } => "MissingRequiredProp",
            Self::UnknownType { .. } => "UnknownType",
            Self::InputNotPlainObject => "InputNotPlainObject",
        }
    }
}

/// One conversion diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
    /// Ancestor labels, root first.
    pub path: Vec<String>,
    pub severity: Severity,
    pub details: MessageDetails,
}

impl Message {
    pub fn unknown_prop(model_type: ModelType, property: impl Into<String>, label: &str) -> Self {
        let property = property.into();
        Self {
            message: format!("Unknown property \"{property}\" was encountered"),
            path: vec![label.to_string()],
            severity: Severity::Warning,
            details: MessageDetails::UnknownProp {
                model_type,
                property,
            },
        }
    }

    pub fn missing_required_prop(
        model_type: ModelType,
        property: impl Into<RequiredProperty>,
        required_type: Option<&str>,
        label: &str,
    ) -> Self {
        let property = property.into();
        Self {
            message: format!("{model_type} missing {property}"),
            path: vec![label.to_string()],
            severity: Severity::Error,
            details: MessageDetails::MissingRequiredProp {
                model_type,
                property,
                required_type: required_type.map(str::to_string),
            },
        }
    }

    pub fn unknown_type(type_name: &str, label: &str) -> Self {
        Self {
            message: format!("Unknown or unsupported type \"{type_name}\""),
            path: vec![label.to_string()],
            severity: Severity::Error,
            details: MessageDetails::UnknownType {
                type_name: type_name.to_string(),
            },
        }
    }

    pub fn input_not_plain_object() -> Self {
        Self {
            message: "Input to conversion functions must be a plain object".to_string(),
            path: Vec::new(),
            severity: Severity::Error,
            details: MessageDetails::InputNotPlainObject,
        }
    }

    /// Replace the human readable text, keeping kind and path.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Prepend one enclosing label to the path.
    pub fn prefixed(mut self, label: &str) -> Self {
        self.path.insert(0, label.to_string());
        self
    }

    /// Prepend several enclosing labels, outermost first.
    pub fn prefixed_with(mut self, labels: &[&str]) -> Self {
        self.path
            .splice(0..0, labels.iter().map(|label| label.to_string()));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Leaf-first rendering of the path, one label per line.
    pub fn breadcrumb(&self) -> String {
        self.path
            .iter()
            .rev()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n     ")
    }
}

/// Prepend `label` to the path of every message.
pub fn prefix_all(messages: Vec<Message>, label: &str) -> impl Iterator<Item = Message> + '_ {
    messages
        .into_iter()
        .map(move |message| message.prefixed(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_prop_text_lists_alternatives() {
        let single = Message::missing_required_prop(ModelType::WmsItem, "url", Some("string"), "A");
        assert_eq!(single.message, "WebMapServiceCatalogItem missing \"url\"");

        let any_of = Message::missing_required_prop(
            ModelType::CsvItem,
            ["url", "data"].as_slice(),
            None,
            "B",
        );
        assert_eq!(any_of.message, "CsvCatalogItem missing \"url\" or \"data\"");
        assert_eq!(any_of.severity, Severity::Error);
    }

    #[test]
    fn prefixes_accumulate_root_first() {
        let message = Message::unknown_type("FAKE", "leaf")
            .prefixed("group")
            .prefixed("catalog");
        assert_eq!(message.path, vec!["catalog", "group", "leaf"]);
        assert_eq!(message.breadcrumb(), "leaf\n     group\n     catalog");

        let story = Message::unknown_type("FAKE", "leaf").prefixed_with(&["Story", "Intro"]);
        assert_eq!(story.path, vec!["Story", "Intro", "leaf"]);
    }

    #[test]
    fn details_serialize_with_kind_tag() {
        let message = Message::missing_required_prop(
            ModelType::GeoJsonItem,
            ["url", "data"].as_slice(),
            None,
            "geo",
        );
        assert_eq!(
            serde_json::to_value(&message.details).expect("details serialize"),
            json!({
                "kind": "MissingRequiredProp",
                "modelType": "GeoJsonCatalogItem",
                "property": ["url", "data"],
            })
        );

        let round_trip: Message =
            serde_json::from_value(serde_json::to_value(&message).expect("message serializes"))
                .expect("message deserializes");
        assert_eq!(round_trip, message);
    }

    #[test]
    fn unknown_type_snapshot() {
        let message = Message::unknown_type("FAKE", "bad").prefixed("catalog");
        insta::assert_json_snapshot!(message, @r#"
        {
          "message": "Unknown or unsupported type \"FAKE\"",
          "path": [
            "catalog",
            "bad"
          ],
          "severity": "error",
          "details": {
            "kind": "UnknownType",
            "type": "FAKE"
          }
        }
        "#);
    }
}
