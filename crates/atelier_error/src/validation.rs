//! Precondition failures on caller input.

/// Specific validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Missing required field
    #[display("Missing required field: {}", _0)]
    MissingField(String),

    /// Invalid field value
    #[display("Invalid value for '{}': {}", field, reason)]
    InvalidField {
        /// The field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Numeric or length value outside its allowed range
    #[display("'{}' must be between {} and {}, got {}", field, min, max, value)]
    OutOfRange {
        /// The field name
        field: String,
        /// Offending value
        value: u64,
        /// Inclusive lower bound
        min: u64,
        /// Inclusive upper bound
        max: u64,
    },
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::MissingField("title".into()));
/// assert_eq!(err.kind(), &ValidationErrorKind::MissingField("title".into()));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    line: u32,
    file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an [`ValidationErrorKind::InvalidField`] error.
    #[track_caller]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::InvalidField {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Shorthand for an [`ValidationErrorKind::OutOfRange`] error.
    #[track_caller]
    pub fn out_of_range(field: impl Into<String>, value: u64, min: u64, max: u64) -> Self {
        Self::new(ValidationErrorKind::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}
