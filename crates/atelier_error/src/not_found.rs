//! Lookup failures.

/// What could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NotFoundErrorKind {
    /// No asset with this id
    #[display("asset {}", _0)]
    Asset(String),
    /// The asset exists but has no such version
    #[display("version {} of asset {}", version, asset)]
    Version {
        /// Asset id
        asset: String,
        /// Requested version number
        version: u32,
    },
    /// No blob stored under this content hash
    #[display("blob {}", _0)]
    Blob(String),
}

/// Not-found error with location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{NotFoundError, NotFoundErrorKind};
///
/// let err = NotFoundError::new(NotFoundErrorKind::Blob("abc".to_string()));
/// assert!(format!("{}", err).contains("blob abc"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Not Found: {} at line {} in {}", kind, line, file)]
pub struct NotFoundError {
    /// What was missing
    pub kind: NotFoundErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NotFoundError {
    /// Create a new not-found error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NotFoundErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
