//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write or commit a file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Stored bytes no longer match their content hash
    #[display("Corrupt blob: {}", _0)]
    Corrupted(String),
    /// A content hash is not a well-formed digest
    #[display("Invalid content hash: {}", _0)]
    InvalidHash(String),
    /// A record could not be encoded for writing
    #[display("Serialization failed: {}", _0)]
    Serialization(String),
}

impl StorageErrorKind {
    /// Whether this error happened while persisting (as opposed to reading).
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StorageErrorKind::DirectoryCreation(_)
                | StorageErrorKind::FileWrite(_)
                | StorageErrorKind::Serialization(_)
        )
    }
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::FileWrite("/data/blobs/ab".to_string()));
/// assert!(format!("{}", err).contains("Failed to write"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
