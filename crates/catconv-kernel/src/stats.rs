//! Summary counts over a conversion's messages.

use crate::message::{Message, MessageDetails, ModelType, Severity};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Message counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindCounts {
    pub unknown_props: usize,
    pub missing_required_props: usize,
    pub unknown_types: usize,
    pub input_not_plain_objects: usize,
}

impl KindCounts {
    fn count(&mut self, details: &MessageDetails) {
        match details {
            MessageDetails::UnknownProp { .. } => self.unknown_props += 1,
            MessageDetails::MissingRequiredProp { .. } => self.missing_required_props += 1,
            MessageDetails::UnknownType { .. } => self.unknown_types += 1,
            MessageDetails::InputNotPlainObject => self.input_not_plain_objects += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unknown_props + self.missing_required_props + self.unknown_types + self.input_not_plain_objects
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStats {
    pub errors: KindCounts,
    pub warnings: KindCounts,
    /// Distinct unregistered types, sorted.
    pub unknown_types: Vec<String>,
    /// How often each unknown property was seen, per model.
    pub unknown_props_by_model: BTreeMap<ModelType, BTreeMap<String, usize>>,
}

impl MessageStats {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut stats = Self::default();
        let mut unknown_types = BTreeSet::new();

        for message in messages {
            match message.severity {
                Severity::Error => stats.errors.count(&message.details),
                Severity::Warning => stats.warnings.count(&message.details),
            }
            match &message.details {
                MessageDetails::UnknownType { type_name } => {
                    unknown_types.insert(type_name.clone());
                }
                MessageDetails::UnknownProp {
                    model_type,
                    property,
                } => {
                    *stats
                        .unknown_props_by_model
                        .entry(*model_type)
                        .or_default()
                        .entry(property.clone())
                        .or_default() += 1;
                }
                _ => {}
            }
        }

        stats.unknown_types = unknown_types.into_iter().collect();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_split_by_severity_and_kind() {
        let messages = vec![
            Message::unknown_type("FAKE", "a"),
            Message::unknown_type("ALSO_FAKE", "b"),
            Message::unknown_type("FAKE", "c"),
            Message::missing_required_prop(ModelType::WmsItem, "url", Some("string"), "d"),
            Message::unknown_prop(ModelType::WmsItem, "odd", "e"),
            Message::unknown_prop(ModelType::WmsItem, "odd", "f"),
            Message::unknown_prop(ModelType::CsvItem, "odd", "g"),
        ];
        let stats = MessageStats::from_messages(&messages);

        assert_eq!(
            stats.errors,
            KindCounts {
                unknown_types: 3,
                missing_required_props: 1,
                ..KindCounts::default()
            }
        );
        assert_eq!(stats.warnings.unknown_props, 3);
        assert_eq!(stats.warnings.total(), 3);
        assert_eq!(stats.unknown_types, vec!["ALSO_FAKE", "FAKE"]);
        assert_eq!(stats.unknown_props_by_model[&ModelType::WmsItem]["odd"], 2);
        assert_eq!(stats.unknown_props_by_model[&ModelType::CsvItem]["odd"], 1);
    }

    #[test]
    fn serializes_with_model_names() {
        let stats = MessageStats::from_messages(&[Message::unknown_prop(ModelType::WmsItem, "x", "a")]);
        insta::assert_json_snapshot!(stats, @r###"
        {
          "errors": {
            "unknownProps": 0,
            "missingRequiredProps": 0,
            "unknownTypes": 0,
            "inputNotPlainObjects": 0
          },
          "warnings": {
            "unknownProps": 1,
            "missingRequiredProps": 0,
            "unknownTypes": 0,
            "inputNotPlainObjects": 0
          },
          "unknownTypes": [],
          "unknownPropsByModel": {
            "WebMapServiceCatalogItem": {
              "x": 1
            }
          }
        }
        "###);
    }
}
