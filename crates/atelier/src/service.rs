//! The asset service: every externally reachable operation.

use crate::{
    AssetListResponse, AssetResponse, AtelierConfig, BulkItemError, BulkItemResult, Download,
    UrlBuilder, VersionListResponse, VersionResponse,
};
use atelier_cache::{ImageTransformer, Rendition, RenditionCache, Transformer};
use atelier_catalog::{Catalog, MetadataStore, VersionManager};
use atelier_core::{
    AssetId, AssetMetadata, AssetQuery, MetadataPatch, Page, PageRequest, TagCount,
    TransformSpec, Upload, VersionSelector,
};
use atelier_error::AtelierResult;
use atelier_storage::{BlobStore, BlobUsage, FileSystemBlobStore, MemoryBlobStore};
use futures::StreamExt;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Bulk items processed at once.
const BULK_CONCURRENCY: usize = 4;

/// One asset to create: its metadata and its first upload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    /// Descriptive metadata
    pub metadata: AssetMetadata,
    /// Version 1 contents
    pub upload: Upload,
}

impl NewAsset {
    /// Pair metadata with an upload.
    pub fn new(metadata: AssetMetadata, upload: Upload) -> Self {
        Self { metadata, upload }
    }
}

/// Facade over blob storage, the catalog and the rendition cache.
///
/// # Example
///
/// ```rust
/// use atelier::{AssetService, AtelierConfig};
/// use atelier_core::{AssetMetadata, Upload};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = AssetService::in_memory(&AtelierConfig::default());
/// let asset = service
///     .create_asset(
///         AssetMetadata::new("Logo"),
///         Upload::new("logo.png", "image/png", vec![0x89, b'P', b'N', b'G']),
///     )
///     .await?;
/// assert_eq!(asset.version, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AssetService {
    versions: VersionManager,
    renditions: RenditionCache,
    urls: UrlBuilder,
}

impl AssetService {
    /// Assemble a service from its parts.
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        store: Arc<dyn MetadataStore>,
        transformer: Arc<dyn Transformer>,
        config: &AtelierConfig,
    ) -> Self {
        let renditions = RenditionCache::new(config.renditions().clone(), blobs.clone(), transformer);
        let versions = VersionManager::new(blobs, store, *config.storage().max_upload_bytes());
        Self {
            versions,
            renditions,
            urls: UrlBuilder::new(config.server().public_base_url()),
        }
    }

    /// Service over the filesystem blob store and the durable catalog under
    /// the configured data root.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the data directories cannot be created or
    /// existing records cannot be loaded.
    #[tracing::instrument(skip(config), fields(root = %config.storage().root().display()))]
    pub async fn open(config: &AtelierConfig) -> AtelierResult<Self> {
        let blobs = FileSystemBlobStore::new(config.storage().blobs_dir())?;
        let catalog = Catalog::open(config.storage().catalog_dir(), config.catalog().clone()).await?;
        Ok(Self::new(
            Arc::new(blobs),
            Arc::new(catalog),
            Arc::new(ImageTransformer::new()),
            config,
        ))
    }

    /// Service that keeps everything in memory.
    pub fn in_memory(config: &AtelierConfig) -> Self {
        Self::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(Catalog::in_memory(config.catalog().clone())),
            Arc::new(ImageTransformer::new()),
            config,
        )
    }

    fn store(&self) -> &Arc<dyn MetadataStore> {
        self.versions.store()
    }

    /// URL builder used for responses.
    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// The rendition cache.
    pub fn renditions(&self) -> &RenditionCache {
        &self.renditions
    }

    /// Create an asset with `upload` as version 1.
    ///
    /// The asset becomes visible only once both the bytes and the record are
    /// stored.
    #[tracing::instrument(skip(self, metadata, upload), fields(title = %metadata.title, filename = %upload.filename))]
    pub async fn create_asset(
        &self,
        metadata: AssetMetadata,
        upload: Upload,
    ) -> AtelierResult<AssetResponse> {
        let asset = self.versions.create_asset(metadata, upload).await?;
        Ok(AssetResponse::new(&asset, &self.urls))
    }

    /// Create many assets, reporting each item's outcome independently.
    ///
    /// A failing item does not stop the others. Results are in request order.
    #[tracing::instrument(skip(self, items), fields(count = items.len()))]
    pub async fn bulk_create(&self, items: Vec<NewAsset>) -> Vec<BulkItemResult> {
        let results: Vec<BulkItemResult> = futures::stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| async move {
                let filename = item.upload.filename.clone();
                match self.create_asset(item.metadata, item.upload).await {
                    Ok(asset) => BulkItemResult {
                        index,
                        filename,
                        asset: Some(asset),
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!(index, filename = %filename, error = %e, "Bulk item failed");
                        BulkItemResult {
                            index,
                            filename,
                            asset: None,
                            error: Some(BulkItemError::from(&e)),
                        }
                    }
                }
            })
            .buffered(BULK_CONCURRENCY)
            .collect()
            .await;

        let created = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(created, failed = results.len() - created, "Bulk create finished");
        results
    }

    /// Upload a new version of an existing asset.
    pub async fn add_version(
        &self,
        asset_id: AssetId,
        upload: Upload,
    ) -> AtelierResult<VersionResponse> {
        let version = self.versions.add_version(asset_id, upload).await?;
        Ok(VersionResponse::new(&version, &self.urls))
    }

    /// Current view of an asset.
    pub async fn get_asset(&self, asset_id: AssetId) -> AtelierResult<AssetResponse> {
        let asset = self.store().get(asset_id).await?;
        Ok(AssetResponse::new(&asset, &self.urls))
    }

    /// One version of an asset.
    pub async fn get_version(
        &self,
        asset_id: AssetId,
        selector: VersionSelector,
    ) -> AtelierResult<VersionResponse> {
        let version = self.versions.get_version(asset_id, selector).await?;
        Ok(VersionResponse::new(&version, &self.urls))
    }

    /// Version history of an asset, oldest first.
    pub async fn list_versions(&self, asset_id: AssetId) -> AtelierResult<VersionListResponse> {
        let versions = self.versions.list_versions(asset_id).await?;
        Ok(VersionListResponse {
            asset_id,
            versions: versions
                .iter()
                .map(|v| VersionResponse::new(v, &self.urls))
                .collect(),
        })
    }

    /// Bytes of the current version.
    pub async fn download(&self, asset_id: AssetId) -> AtelierResult<Download> {
        self.download_version(asset_id, VersionSelector::Latest).await
    }

    /// Bytes of a specific version.
    #[tracing::instrument(skip(self))]
    pub async fn download_version(
        &self,
        asset_id: AssetId,
        selector: VersionSelector,
    ) -> AtelierResult<Download> {
        let (version, bytes) = self.versions.read(asset_id, selector).await?;
        Ok(Download {
            version: VersionResponse::new(&version, &self.urls),
            bytes,
        })
    }

    /// Filtered, paginated listing, newest first.
    pub async fn search(&self, query: &AssetQuery) -> AtelierResult<AssetListResponse> {
        let page = self.store().list(query).await?;
        Ok(AssetListResponse::new(page, &self.urls))
    }

    /// Apply a partial metadata update.
    pub async fn update_metadata(
        &self,
        asset_id: AssetId,
        patch: MetadataPatch,
    ) -> AtelierResult<AssetResponse> {
        let asset = self.store().update_metadata(asset_id, patch).await?;
        Ok(AssetResponse::new(&asset, &self.urls))
    }

    /// Replace an asset's tag set wholesale.
    pub async fn replace_tags(
        &self,
        asset_id: AssetId,
        tags: BTreeSet<String>,
    ) -> AtelierResult<AssetResponse> {
        self.update_metadata(asset_id, MetadataPatch::tags(tags))
            .await
    }

    /// Tags in use with per-tag asset counts, alphabetically.
    pub async fn list_tags(
        &self,
        text: Option<&str>,
        page: PageRequest,
    ) -> AtelierResult<Page<TagCount>> {
        self.store().tags(text, page).await
    }

    /// Rendition of a version under `spec`.
    #[tracing::instrument(skip(self))]
    pub async fn transform(
        &self,
        asset_id: AssetId,
        selector: VersionSelector,
        spec: TransformSpec,
    ) -> AtelierResult<Rendition> {
        spec.validate()?;
        let version = self.versions.get_version(asset_id, selector).await?;
        self.renditions.get_or_create(&version, &spec).await
    }

    /// Preview of the current version.
    ///
    /// Without dimensions the configured preview width is used.
    pub async fn preview(
        &self,
        asset_id: AssetId,
        width: Option<u32>,
        height: Option<u32>,
    ) -> AtelierResult<Rendition> {
        let spec = self.renditions.config().preview_spec(width, height);
        self.transform(asset_id, VersionSelector::Latest, spec).await
    }

    /// Blob count and bytes held by the blob store.
    pub async fn storage_usage(&self) -> AtelierResult<BlobUsage> {
        self.versions.blobs().usage().await
    }
}
