//! # Catconv Kernel
//!
//! Converts v7 catalog documents and v7 share documents into their v8
//! equivalents.
//!
//! The kernel is a pure transformation over `serde_json::Value` trees. A
//! malformed node never aborts a conversion: it is dropped from its parent
//! and reported as a [`Message`], while its siblings and ancestors keep
//! converting.
//!
//! ## Architecture
//!
//! ```text
//! convert_catalog / convert_share      ← entry points
//!     │
//! Converter                            ← registry + id generator context
//!     │
//! convert_members_array                ← sibling merge, ids, enabled items,
//!     │                                  path prefixing
//! convert_member                       ← required fields, registry dispatch
//!     │
//! TypeConverter (converters::*)        ← per-type copy/translate tables
//! ```

pub mod convert;
pub mod converters;
pub mod error;
pub mod ids;
pub mod member;
pub mod merge;
pub mod message;
pub mod options;
pub mod registry;
pub mod share;
pub mod stats;
pub mod transfer;

pub use convert::{CatalogResult, Converter, convert_catalog, convert_member};
pub use error::KernelError;
pub use ids::{DEFAULT_ID_LENGTH, IdGenerator, RandomIdGenerator, generate_random_id};
pub use member::{CatalogMember, EnabledItem, JsonObject, MemberResult, MembersResult};
pub use merge::{deep_merge, merge_siblings};
pub use message::{Message, MessageDetails, ModelType, RequiredProperty, Severity};
pub use options::ConversionOptions;
pub use registry::{ConverterEntry, Registry, TypeConverter, registry_json};
pub use share::{ShareResult, convert_share, legacy_id_to_v8};
pub use stats::{KindCounts, MessageStats};
pub use transfer::{IdReplacement, transfer_catalog_ids, transfer_ids};
