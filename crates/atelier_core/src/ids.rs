//! Identifier types.

use atelier_error::{StorageError, StorageErrorKind, ValidationError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque unique identifier of an asset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct AssetId(Uuid);

impl AssetId {
    /// Allocate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for AssetId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ValidationError::invalid("id", e.to_string()))
    }
}

/// Lowercase hex SHA-256 digest of a byte payload.
///
/// Identical bytes always produce the same hash, which is what makes blob
/// storage deduplicating.
///
/// # Example
///
/// ```
/// use atelier_core::ContentHash;
///
/// let a = ContentHash::of(b"logo");
/// let b = ContentHash::of(b"logo");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Length of a hex-encoded SHA-256 digest.
    pub const HEX_LEN: usize = 64;

    /// Compute the hash of `data`.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Parse a previously computed hash.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidHash`] unless `s` is exactly 64
    /// lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let well_formed = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(StorageError::new(StorageErrorKind::InvalidHash(s.to_string())));
        }
        Ok(Self(s.to_string()))
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-level shard prefix used to spread files across directories.
    pub fn shards(&self) -> (&str, &str) {
        (&self.0[0..2], &self.0[2..4])
    }

    /// Check that `data` hashes to this value.
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::of(data) == *self
    }
}

impl TryFrom<String> for ContentHash {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl FromStr for ContentHash {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
