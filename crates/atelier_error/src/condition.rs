//! Stable error conditions exposed to callers.

/// Transport-independent classification of every Atelier error.
///
/// The string codes returned by [`ErrorCondition::code`] are part of the
/// public contract and never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ErrorCondition {
    /// Unknown asset, version, blob or rendition source.
    #[display("not_found")]
    NotFound,
    /// Metadata, upload or transform parameters violate constraints.
    #[display("validation")]
    Validation,
    /// Persistence failed; nothing partial was made visible. Retryable.
    #[display("storage_write")]
    StorageWrite,
    /// Stored bytes could not be read back or failed integrity checks.
    #[display("storage_read")]
    StorageRead,
    /// The image codec rejected the input or the conversion.
    #[display("transform")]
    Transform,
    /// A per-asset write could not be serialized within its bound.
    #[display("conflict")]
    Conflict,
    /// Configuration could not be loaded or is invalid.
    #[display("configuration")]
    Configuration,
}

impl ErrorCondition {
    /// Stable machine-readable code for this condition.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCondition::NotFound => "not_found",
            ErrorCondition::Validation => "validation",
            ErrorCondition::StorageWrite => "storage_write",
            ErrorCondition::StorageRead => "storage_read",
            ErrorCondition::Transform => "transform",
            ErrorCondition::Conflict => "conflict",
            ErrorCondition::Configuration => "configuration",
        }
    }

    /// Whether a caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCondition::StorageWrite | ErrorCondition::Conflict)
    }
}
