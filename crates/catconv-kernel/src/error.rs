//! Error types for kernel operations that are not about input data.
//!
//! Bad catalog or share data is never an `Err`; it is reported through
//! [`crate::Message`]. This type covers misuse of the kernel's own API.

/// Errors arising from invalid kernel configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KernelError {
    /// Two converters were registered for the same `type` discriminator.
    #[error("a converter is already registered for type `{0}`")]
    DuplicateConverter(String),
}
