//! Top-level error wrapper types.

use crate::{
    ConfigError, ConflictError, ErrorCondition, NotFoundError, StorageError, TransformError,
    ValidationError,
};

/// Every error an Atelier operation can surface.
///
/// # Examples
///
/// ```
/// use atelier_error::{AtelierError, ValidationError};
///
/// let err: AtelierError = ValidationError::invalid("title", "empty").into();
/// assert!(format!("{}", err).contains("Validation Error"));
/// ```
#[derive(Debug, Clone, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum AtelierErrorKind {
    /// Unknown asset, version or blob
    #[from(NotFoundError)]
    NotFound(NotFoundError),
    /// Caller input violates constraints
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Persistence failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Codec failure
    #[from(TransformError)]
    Transform(TransformError),
    /// Unresolved concurrent-write conflict
    #[from(ConflictError)]
    Conflict(ConflictError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Atelier error with kind discrimination.
///
/// Cloneable so a single failed derivation can be reported to every caller
/// waiting on it.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Atelier Error: {}", _0)]
pub struct AtelierError(Box<AtelierErrorKind>);

impl AtelierError {
    /// Create a new error from a kind.
    pub fn new(kind: AtelierErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AtelierErrorKind {
        &self.0
    }

    /// Stable condition this error maps to.
    pub fn condition(&self) -> ErrorCondition {
        match self.kind() {
            AtelierErrorKind::NotFound(_) => ErrorCondition::NotFound,
            AtelierErrorKind::Validation(_) => ErrorCondition::Validation,
            AtelierErrorKind::Storage(e) if e.kind.is_write() => ErrorCondition::StorageWrite,
            AtelierErrorKind::Storage(_) => ErrorCondition::StorageRead,
            AtelierErrorKind::Transform(_) => ErrorCondition::Transform,
            AtelierErrorKind::Conflict(_) => ErrorCondition::Conflict,
            AtelierErrorKind::Config(_) => ErrorCondition::Configuration,
        }
    }

    /// Shorthand for `condition() == ErrorCondition::NotFound`.
    pub fn is_not_found(&self) -> bool {
        self.condition() == ErrorCondition::NotFound
    }
}

// Generic From implementation for any type that converts to AtelierErrorKind
impl<T> From<T> for AtelierError
where
    T: Into<AtelierErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Atelier operations.
pub type AtelierResult<T> = std::result::Result<T, AtelierError>;
