//! Binding uploaded bytes to asset versions.

use crate::MetadataStore;
use atelier_core::{Asset, AssetId, AssetMetadata, Upload, Version, VersionDraft, VersionSelector};
use atelier_error::{AtelierResult, StorageError, StorageErrorKind};
use atelier_storage::BlobStore;
use std::sync::Arc;

/// Coordinates the blob store and the metadata store for version operations.
///
/// Bytes are always stored before the version record that references them, so
/// a recorded version never points at a missing blob. An upload that fails
/// after its bytes are stored leaves only an unreferenced, content-addressed
/// blob behind.
#[derive(Clone)]
pub struct VersionManager {
    blobs: Arc<dyn BlobStore>,
    store: Arc<dyn MetadataStore>,
    max_upload_bytes: u64,
}

impl std::fmt::Debug for VersionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionManager")
            .field("blobs", &self.blobs.backend())
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

impl VersionManager {
    /// Create a version manager.
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        store: Arc<dyn MetadataStore>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            blobs,
            store,
            max_upload_bytes,
        }
    }

    /// Blob store holding version bytes.
    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Metadata store holding version records.
    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    /// Largest accepted upload in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Validate an upload and store its bytes.
    async fn stage(&self, upload: Upload) -> AtelierResult<VersionDraft> {
        upload.validate(self.max_upload_bytes)?;
        let content_hash = self.blobs.put(&upload.bytes).await?;
        Ok(VersionDraft {
            content_hash,
            size: upload.bytes.len() as u64,
            mimetype: upload.mimetype,
            filename: upload.filename,
        })
    }

    /// Create a new asset whose version 1 holds `upload`.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is stored if the metadata or
    /// upload is invalid, and a storage error if persisting fails. On error no
    /// asset exists.
    #[tracing::instrument(skip(self, metadata, upload), fields(filename = %upload.filename))]
    pub async fn create_asset(
        &self,
        metadata: AssetMetadata,
        upload: Upload,
    ) -> AtelierResult<Asset> {
        self.store.policy().validate(&metadata)?;
        let draft = self.stage(upload).await?;
        self.store.create(metadata, draft).await
    }

    /// Append `upload` as the next version of an existing asset.
    ///
    /// Concurrent calls for the same asset all succeed and receive distinct,
    /// consecutive numbers.
    ///
    /// # Errors
    ///
    /// Returns not-found for an unknown asset (before storing any bytes), a
    /// validation error for an invalid upload, and a conflict error if the
    /// asset stays locked past the configured timeout.
    #[tracing::instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub async fn add_version(&self, asset_id: AssetId, upload: Upload) -> AtelierResult<Version> {
        self.store.get(asset_id).await?;
        let draft = self.stage(upload).await?;
        self.store.append_version(asset_id, draft).await
    }

    /// Resolve a version of an asset.
    pub async fn get_version(
        &self,
        asset_id: AssetId,
        selector: VersionSelector,
    ) -> AtelierResult<Version> {
        self.store.version(asset_id, selector).await
    }

    /// Every version of an asset, ascending by number.
    pub async fn list_versions(&self, asset_id: AssetId) -> AtelierResult<Vec<Version>> {
        self.store.versions(asset_id).await
    }

    /// Resolve a version and read its bytes.
    ///
    /// # Errors
    ///
    /// Returns not-found for an unknown asset or version and a storage read
    /// error if the stored bytes are missing or fail verification.
    pub async fn read(
        &self,
        asset_id: AssetId,
        selector: VersionSelector,
    ) -> AtelierResult<(Version, Vec<u8>)> {
        let version = self.get_version(asset_id, selector).await?;
        let bytes = self.read_version(&version).await?;
        Ok((version, bytes))
    }

    /// Read the bytes of a resolved version.
    pub async fn read_version(&self, version: &Version) -> AtelierResult<Vec<u8>> {
        let bytes = self.blobs.get(&version.content_hash).await.map_err(|e| {
            if e.is_not_found() {
                // A recorded version always has its blob; a missing one is damage.
                StorageError::new(StorageErrorKind::Corrupted(format!(
                    "blob {} for version {} of asset {} is missing",
                    version.content_hash, version.number, version.asset_id
                )))
                .into()
            } else {
                e
            }
        })?;
        if bytes.len() as u64 != version.size {
            return Err(StorageError::new(StorageErrorKind::Corrupted(format!(
                "blob {} holds {} bytes, version {} of asset {} recorded {}",
                version.content_hash,
                bytes.len(),
                version.number,
                version.asset_id,
                version.size
            )))
            .into());
        }
        Ok(bytes)
    }
}
