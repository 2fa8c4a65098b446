//! Built-in converters, one per v7 `type`.
//!
//! Each converter has the [`TypeConverter`](crate::registry::TypeConverter)
//! signature and is registered in [`Registry::builtin`](crate::registry::Registry::builtin).

pub mod ckan;
pub mod csv;
pub mod esri;
pub mod group;
pub mod item;
pub mod other;
pub mod props;
pub mod wms;
