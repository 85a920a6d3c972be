//! Response shapes returned by [`AssetService`](crate::AssetService).
//!
//! Field names and the timestamp format (`YYYY-MM-DDTHH:MM:SS.ffffffZ`) are a
//! stable contract with callers.

use crate::UrlBuilder;
use atelier_core::{Asset, AssetId, AssetMetadata, Page, Version, timestamp};
use atelier_error::AtelierError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An asset as seen by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetResponse {
    /// Asset id
    pub id: AssetId,
    /// Filename of the current version
    pub filename: String,
    /// Download URL of the current version
    pub url: String,
    /// Descriptive metadata
    pub metadata: AssetMetadata,
    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Time of the last metadata edit or upload
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Size of the current version in bytes
    pub size: u64,
    /// MIME type of the current version
    pub mimetype: String,
    /// Current version number
    pub version: u32,
}

impl AssetResponse {
    /// Build the response for `asset`.
    pub fn new(asset: &Asset, urls: &UrlBuilder) -> Self {
        Self {
            id: asset.id,
            filename: asset.filename().to_string(),
            url: urls.download(asset.id),
            metadata: asset.metadata.clone(),
            created_at: asset.created_at,
            updated_at: asset.updated_at,
            size: asset.size(),
            mimetype: asset.mimetype().to_string(),
            version: asset.version(),
        }
    }
}

/// One version as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    /// Version number
    pub version: u32,
    /// Upload time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Download URL of this version
    pub url: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type
    pub mimetype: String,
    /// Filename supplied at upload
    pub filename: String,
}

impl VersionResponse {
    /// Build the response for `version`.
    pub fn new(version: &Version, urls: &UrlBuilder) -> Self {
        Self {
            version: version.number,
            created_at: version.created_at,
            url: urls.version(version.asset_id, version.number),
            size: version.size,
            mimetype: version.mimetype.clone(),
            filename: version.filename.clone(),
        }
    }
}

/// Version history of an asset, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionListResponse {
    /// Asset id
    pub asset_id: AssetId,
    /// Versions in ascending order
    pub versions: Vec<VersionResponse>,
}

/// One page of assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetListResponse {
    /// Assets on this page
    pub items: Vec<AssetResponse>,
    /// Matches across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    /// Requested page size
    pub size: u32,
}

impl AssetListResponse {
    /// Build the response for a page of assets.
    pub fn new(page: Page<Asset>, urls: &UrlBuilder) -> Self {
        let page = page.map(|asset| AssetResponse::new(&asset, urls));
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            size: page.size,
        }
    }
}

/// Why one bulk item failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
    /// Stable condition code (e.g. "validation")
    pub condition: String,
    /// Human-readable description
    pub message: String,
}

impl From<&AtelierError> for BulkItemError {
    fn from(err: &AtelierError) -> Self {
        Self {
            condition: err.condition().code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one item in a bulk create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResult {
    /// Position of the item in the request
    pub index: usize,
    /// Filename supplied for the item
    pub filename: String,
    /// Created asset, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetResponse>,
    /// Failure, otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BulkItemError>,
}

impl BulkItemResult {
    /// Whether the item was created.
    pub fn is_success(&self) -> bool {
        self.asset.is_some()
    }
}

/// Bytes of one version, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Version the bytes belong to
    pub version: VersionResponse,
    /// File contents
    pub bytes: Vec<u8>,
}
