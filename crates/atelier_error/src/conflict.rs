//! Concurrent-write conflicts.

/// Specific conflict conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ConflictErrorKind {
    /// The asset's serialization point was not acquired in time
    #[display("Timed out after {}ms waiting for asset {}", waited_ms, asset)]
    LockTimeout {
        /// Asset id
        asset: String,
        /// How long the writer waited
        waited_ms: u64,
    },
    /// An id was allocated twice
    #[display("Duplicate asset id: {}", _0)]
    DuplicateAsset(String),
    /// A version number would break the 1..N sequence
    #[display("Version sequence broken for asset {}: expected {}, got {}", asset, expected, found)]
    VersionSequence {
        /// Asset id
        asset: String,
        /// Next number the sequence allows
        expected: u32,
        /// Number that was offered
        found: u32,
    },
}

/// Conflict error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Conflict Error: {} at line {} in {}", kind, line, file)]
pub struct ConflictError {
    /// The kind of error that occurred
    pub kind: ConflictErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConflictError {
    /// Create a new conflict error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConflictErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
