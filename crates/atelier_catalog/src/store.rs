//! Metadata store trait.

use atelier_core::{
    Asset, AssetId, AssetMetadata, AssetQuery, MetadataPatch, MetadataPolicy, Page, PageRequest,
    TagCount, Version, VersionDraft, VersionSelector,
};
use atelier_error::AtelierResult;

/// Authoritative store of assets, their version histories and their metadata.
///
/// Writes to one asset are serialized; writes to different assets proceed
/// independently. A write is visible to every subsequent read once it returns,
/// and a failed write leaves no trace.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create an asset together with its version 1.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `metadata` violates the store's policy
    /// and a storage write error if the record cannot be persisted.
    async fn create(&self, metadata: AssetMetadata, draft: VersionDraft) -> AtelierResult<Asset>;

    /// Current view of an asset.
    async fn get(&self, id: AssetId) -> AtelierResult<Asset>;

    /// Apply a partial metadata update and return the updated asset.
    ///
    /// Metadata edits do not create versions.
    async fn update_metadata(&self, id: AssetId, patch: MetadataPatch) -> AtelierResult<Asset>;

    /// Append the next version to an asset's history.
    ///
    /// The new version number is exactly one more than the previous current
    /// version, even when many appends race.
    ///
    /// # Errors
    ///
    /// Returns not-found for an unknown asset and a conflict error if the
    /// asset's write turn is not obtained within the configured timeout.
    async fn append_version(&self, id: AssetId, draft: VersionDraft) -> AtelierResult<Version>;

    /// Resolve one version of an asset.
    async fn version(&self, id: AssetId, selector: VersionSelector) -> AtelierResult<Version>;

    /// Every version of an asset, ascending by number.
    async fn versions(&self, id: AssetId) -> AtelierResult<Vec<Version>>;

    /// Filtered, paginated listing ordered newest first.
    async fn list(&self, query: &AssetQuery) -> AtelierResult<Page<Asset>>;

    /// Tags in use with per-tag asset counts.
    async fn tags(&self, text: Option<&str>, page: PageRequest) -> AtelierResult<Page<TagCount>>;

    /// Limits applied to metadata on create and update.
    fn policy(&self) -> &MetadataPolicy;
}
