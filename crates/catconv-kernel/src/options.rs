//! Conversion options threaded through every conversion call.

use crate::ids::DEFAULT_ID_LENGTH;
use serde::{Deserialize, Serialize};

/// Options controlling one conversion.
///
/// Missing keys in a serialized options document take their defaults, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Copy fields a converter does not know into the output verbatim.
    pub copy_unknown_properties: bool,
    /// Relax `name` and per-type required fields. Used for embedded
    /// property bags and share documents.
    pub partial: bool,
    /// Give every converted member without an `id` a random one.
    pub generate_ids: bool,
    pub id_length: usize,
    /// Record each member's v7 path id (`Root Group/...`) in `shareKeys`.
    pub add_v7_auto_id_share_keys: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            copy_unknown_properties: false,
            partial: false,
            generate_ids: true,
            id_length: DEFAULT_ID_LENGTH,
            add_v7_auto_id_share_keys: true,
        }
    }
}

impl ConversionOptions {
    /// Options for members of a share document.
    pub fn partial() -> Self {
        Self {
            partial: true,
            ..Self::default()
        }
    }

    /// Options for an embedded `itemProperties` bag: partial, no ids.
    pub fn for_item_properties(&self) -> Self {
        Self {
            partial: true,
            generate_ids: false,
            ..self.clone()
        }
    }
}
