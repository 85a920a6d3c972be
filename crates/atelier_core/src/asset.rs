//! Asset and version records.

use crate::{AssetId, AssetMetadata, ContentHash, timestamp};
use atelier_error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Immutable record of one uploaded revision of an asset.
///
/// Once created, neither the number nor the content reference ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Owning asset
    pub asset_id: AssetId,
    /// 1-based, gapless, never reused
    pub number: u32,
    /// Blob holding this version's bytes
    pub content_hash: ContentHash,
    /// Payload size in bytes
    pub size: u64,
    /// MIME type supplied at upload
    pub mimetype: String,
    /// Original filename supplied at upload
    pub filename: String,
    /// When the version was recorded
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Current view of an asset: its metadata plus its latest version.
///
/// Holding the current [`Version`] by value means an asset without versions is
/// not representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identity
    pub id: AssetId,
    /// Mutable descriptive metadata
    pub metadata: AssetMetadata,
    /// When the asset (and its version 1) was created
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last metadata edit or version upload
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Latest version
    pub current: Version,
}

impl Asset {
    /// Current version number.
    pub fn version(&self) -> u32 {
        self.current.number
    }

    /// Filename of the current version.
    pub fn filename(&self) -> &str {
        &self.current.filename
    }

    /// MIME type of the current version.
    pub fn mimetype(&self) -> &str {
        &self.current.mimetype
    }

    /// Size in bytes of the current version.
    pub fn size(&self) -> u64 {
        self.current.size
    }
}

/// Everything needed to bind stored bytes as a new version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDraft {
    /// Hash returned by the blob store
    pub content_hash: ContentHash,
    /// Payload size in bytes
    pub size: u64,
    /// MIME type
    pub mimetype: String,
    /// Original filename
    pub filename: String,
}

/// Which version of an asset to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum VersionSelector {
    /// The current version
    #[default]
    #[display("latest")]
    Latest,
    /// A specific 1-based version number
    #[display("{}", _0)]
    Number(u32),
}

impl From<u32> for VersionSelector {
    fn from(number: u32) -> Self {
        VersionSelector::Number(number)
    }
}

impl FromStr for VersionSelector {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("latest") {
            return Ok(VersionSelector::Latest);
        }
        match s.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(VersionSelector::Number(n)),
            _ => Err(ValidationError::invalid(
                "version",
                format!("expected 'latest' or a number >= 1, got '{}'", s),
            )),
        }
    }
}

/// An uploaded file as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original filename
    pub filename: String,
    /// Declared MIME type
    pub mimetype: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create an upload.
    pub fn new(filename: impl Into<String>, mimetype: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mimetype: mimetype.into(),
            bytes,
        }
    }

    /// Check filename, MIME type and size bounds.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty file, a file larger than
    /// `max_bytes`, an empty filename, or a malformed MIME type.
    pub fn validate(&self, max_bytes: u64) -> Result<(), ValidationError> {
        let size = self.bytes.len() as u64;
        if size == 0 || size > max_bytes {
            return Err(ValidationError::out_of_range("file", size, 1, max_bytes));
        }
        if self.filename.trim().is_empty() || self.filename.chars().count() > 255 {
            return Err(ValidationError::invalid(
                "filename",
                "must be 1-255 characters",
            ));
        }
        validate_mimetype(&self.mimetype)
    }
}

/// Check that `mimetype` has the `type/subtype` shape.
///
/// ```
/// assert!(atelier_core::validate_mimetype("image/png").is_ok());
/// assert!(atelier_core::validate_mimetype("png").is_err());
/// ```
pub fn validate_mimetype(mimetype: &str) -> Result<(), ValidationError> {
    let essence = mimetype.split(';').next().unwrap_or_default().trim();
    let mut parts = essence.splitn(2, '/');
    let well_formed = match (parts.next(), parts.next()) {
        (Some(kind), Some(subtype)) => {
            is_token(kind) && is_token(subtype) && mimetype.len() <= 128
        }
        _ => false,
    };
    if !well_formed {
        return Err(ValidationError::invalid(
            "mimetype",
            format!("'{}' is not a type/subtype MIME string", mimetype),
        ));
    }
    Ok(())
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&b))
}
