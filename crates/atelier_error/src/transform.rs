//! Rendition derivation errors.

/// Specific transform failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TransformErrorKind {
    /// The source version cannot be transformed (e.g. not an image)
    #[display("Unsupported source: {}", _0)]
    UnsupportedSource(String),
    /// The codec could not decode the source bytes
    #[display("Failed to decode source: {}", _0)]
    Decode(String),
    /// The codec could not encode the requested output
    #[display("Failed to encode output: {}", _0)]
    Encode(String),
    /// The worker running the codec failed before producing a result
    #[display("Transform worker failed: {}", _0)]
    Worker(String),
}

impl TransformErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransformErrorKind::Worker(_))
    }
}

/// Transform error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transform Error: {} at line {} in {}", kind, line, file)]
pub struct TransformError {
    /// The kind of error that occurred
    pub kind: TransformErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransformError {
    /// Create a new transform error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Check if this error should be retried.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
