//! Default [`MetadataStore`] implementation.

use crate::{AssetRecord, CatalogConfig, MetadataStore, MonotonicClock, RecordDir, SearchIndex};
use atelier_core::{
    Asset, AssetId, AssetMetadata, AssetQuery, MetadataPatch, MetadataPolicy, Page, PageRequest,
    TagCount, Version, VersionDraft, VersionSelector,
};
use atelier_error::{
    AtelierError, AtelierResult, ConflictError, ConflictErrorKind, NotFoundError,
    NotFoundErrorKind,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, MutexGuard};

/// One asset's write turn plus its latest committed record.
#[derive(Debug)]
struct AssetSlot {
    writer: Mutex<()>,
    current: RwLock<Arc<AssetRecord>>,
}

impl AssetSlot {
    fn new(record: AssetRecord) -> Self {
        Self {
            writer: Mutex::new(()),
            current: RwLock::new(Arc::new(record)),
        }
    }

    fn snapshot(&self) -> Arc<AssetRecord> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn commit(&self, record: AssetRecord) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(record);
    }
}

/// Asset catalog with per-asset write serialization.
///
/// Writers take the asset's write turn (waiting at most the configured lock
/// timeout), build the next record, persist it when the catalog is durable,
/// and only then publish it to readers and the search index. Readers never
/// wait on writers; they see the last committed record.
///
/// # Example
///
/// ```rust
/// use atelier_catalog::{Catalog, CatalogConfig, MetadataStore};
/// use atelier_core::{AssetMetadata, ContentHash, VersionDraft};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = Catalog::in_memory(CatalogConfig::default());
/// let draft = VersionDraft {
///     content_hash: ContentHash::of(b"logo"),
///     size: 4,
///     mimetype: "image/png".to_string(),
///     filename: "logo.png".to_string(),
/// };
/// let asset = catalog.create(AssetMetadata::new("Logo"), draft).await?;
/// assert_eq!(asset.version(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Catalog {
    slots: RwLock<HashMap<AssetId, Arc<AssetSlot>>>,
    index: SearchIndex,
    clock: MonotonicClock,
    records: Option<RecordDir>,
    config: CatalogConfig,
}

impl Catalog {
    /// Catalog that keeps everything in memory.
    pub fn in_memory(config: CatalogConfig) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            index: SearchIndex::new(),
            clock: MonotonicClock::new(),
            records: None,
            config,
        }
    }

    /// Durable catalog backed by a record directory.
    ///
    /// Existing records are loaded and the search index is rebuilt from them.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the directory cannot be created or a record
    /// is unreadable or inconsistent.
    #[tracing::instrument(skip(dir, config))]
    pub async fn open(dir: impl Into<PathBuf>, config: CatalogConfig) -> AtelierResult<Self> {
        let records = RecordDir::open(dir).await?;
        let loaded = records.load_all().await?;

        let catalog = Self {
            records: Some(records),
            ..Self::in_memory(config)
        };
        {
            let mut slots = catalog.write_slots();
            for record in loaded {
                catalog.clock.observe(record.asset.updated_at);
                if let Some(last) = record.versions.last() {
                    catalog.clock.observe(last.created_at);
                }
                catalog.index.upsert(&record.asset);
                slots.insert(record.asset.id, Arc::new(AssetSlot::new(record)));
            }
        }

        tracing::info!(
            path = %catalog.records.as_ref().map(|r| r.path().display().to_string()).unwrap_or_default(),
            assets = catalog.len(),
            "Opened asset catalog"
        );
        Ok(catalog)
    }

    /// Configuration in effect.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Whether writes are persisted.
    pub fn is_durable(&self) -> bool {
        self.records.is_some()
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.read_slots().len()
    }

    /// Whether the catalog holds no assets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, HashMap<AssetId, Arc<AssetSlot>>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slots(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<AssetId, Arc<AssetSlot>>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, id: AssetId) -> AtelierResult<Arc<AssetSlot>> {
        self.read_slots()
            .get(&id)
            .cloned()
            .ok_or_else(|| NotFoundError::new(NotFoundErrorKind::Asset(id.to_string())).into())
    }

    async fn write_turn<'a>(
        &self,
        id: AssetId,
        slot: &'a AssetSlot,
    ) -> AtelierResult<MutexGuard<'a, ()>> {
        let timeout = self.config.lock_timeout();
        tokio::time::timeout(timeout, slot.writer.lock())
            .await
            .map_err(|_| {
                tracing::warn!(asset = %id, waited_ms = timeout.as_millis() as u64, "Write turn timed out");
                AtelierError::from(ConflictError::new(ConflictErrorKind::LockTimeout {
                    asset: id.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                }))
            })
    }

    async fn persist(&self, record: &AssetRecord) -> AtelierResult<()> {
        match &self.records {
            Some(records) => records.save(record).await,
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl MetadataStore for Catalog {
    #[tracing::instrument(skip(self, metadata, draft), fields(hash = %draft.content_hash))]
    async fn create(&self, metadata: AssetMetadata, draft: VersionDraft) -> AtelierResult<Asset> {
        self.config.metadata().validate(&metadata)?;

        let id = AssetId::new();
        let now = self.clock.now();
        let version = Version {
            asset_id: id,
            number: 1,
            content_hash: draft.content_hash,
            size: draft.size,
            mimetype: draft.mimetype,
            filename: draft.filename,
            created_at: now,
        };
        let asset = Asset {
            id,
            metadata,
            created_at: now,
            updated_at: now,
            current: version.clone(),
        };
        let record = AssetRecord {
            asset: asset.clone(),
            versions: vec![version],
        };

        if self.read_slots().contains_key(&id) {
            return Err(ConflictError::new(ConflictErrorKind::DuplicateAsset(id.to_string())).into());
        }
        self.persist(&record).await?;

        let slot = Arc::new(AssetSlot::new(record));
        // Hold the write turn until the index reflects the new asset.
        let _turn = slot.writer.lock().await;
        {
            let mut slots = self.write_slots();
            if slots.contains_key(&id) {
                return Err(
                    ConflictError::new(ConflictErrorKind::DuplicateAsset(id.to_string())).into(),
                );
            }
            slots.insert(id, Arc::clone(&slot));
        }
        self.index.upsert(&asset);

        tracing::info!(asset = %id, title = %asset.metadata.title, "Created asset");
        Ok(asset)
    }

    async fn get(&self, id: AssetId) -> AtelierResult<Asset> {
        Ok(self.slot(id)?.snapshot().asset.clone())
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update_metadata(&self, id: AssetId, patch: MetadataPatch) -> AtelierResult<Asset> {
        let slot = self.slot(id)?;
        let _turn = self.write_turn(id, &slot).await?;
        let current = slot.snapshot();

        if patch.is_empty() {
            return Ok(current.asset.clone());
        }
        let metadata = patch.apply(&current.asset.metadata);
        self.config.metadata().validate(&metadata)?;

        let mut next = AssetRecord::clone(&current);
        next.asset.metadata = metadata;
        next.asset.updated_at = self.clock.now();

        self.persist(&next).await?;
        let asset = next.asset.clone();
        slot.commit(next);
        self.index.upsert(&asset);

        tracing::info!(asset = %id, "Updated asset metadata");
        Ok(asset)
    }

    #[tracing::instrument(skip(self, draft), fields(hash = %draft.content_hash))]
    async fn append_version(&self, id: AssetId, draft: VersionDraft) -> AtelierResult<Version> {
        let slot = self.slot(id)?;
        let _turn = self.write_turn(id, &slot).await?;
        let current = slot.snapshot();

        let number = current.next_number();
        if current.asset.current.number + 1 != number {
            return Err(ConflictError::new(ConflictErrorKind::VersionSequence {
                asset: id.to_string(),
                expected: current.asset.current.number + 1,
                found: number,
            })
            .into());
        }

        let now = self.clock.now();
        let version = Version {
            asset_id: id,
            number,
            content_hash: draft.content_hash,
            size: draft.size,
            mimetype: draft.mimetype,
            filename: draft.filename,
            created_at: now,
        };
        let mut next = AssetRecord::clone(&current);
        next.versions.push(version.clone());
        next.asset.current = version.clone();
        next.asset.updated_at = now;

        self.persist(&next).await?;
        let asset = next.asset.clone();
        slot.commit(next);
        self.index.upsert(&asset);

        tracing::info!(asset = %id, version = number, "Appended version");
        Ok(version)
    }

    async fn version(&self, id: AssetId, selector: VersionSelector) -> AtelierResult<Version> {
        let record = self.slot(id)?.snapshot();
        let found = match selector {
            VersionSelector::Latest => Some(&record.asset.current),
            VersionSelector::Number(n) => n
                .checked_sub(1)
                .and_then(|index| record.versions.get(index as usize)),
        };
        found.cloned().ok_or_else(|| {
            let number = match selector {
                VersionSelector::Latest => record.asset.current.number,
                VersionSelector::Number(n) => n,
            };
            NotFoundError::new(NotFoundErrorKind::Version {
                asset: id.to_string(),
                version: number,
            })
            .into()
        })
    }

    async fn versions(&self, id: AssetId) -> AtelierResult<Vec<Version>> {
        Ok(self.slot(id)?.snapshot().versions.clone())
    }

    async fn list(&self, query: &AssetQuery) -> AtelierResult<Page<Asset>> {
        query.page.validate()?;
        let query = query.clone().normalized();
        Ok(self.index.query(&query))
    }

    async fn tags(&self, text: Option<&str>, page: PageRequest) -> AtelierResult<Page<TagCount>> {
        page.validate()?;
        let text = text.map(str::trim).filter(|t| !t.is_empty());
        Ok(self.index.tags(text, page))
    }

    fn policy(&self) -> &MetadataPolicy {
        self.config.metadata()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::ContentHash;
    use atelier_error::ErrorCondition;

    fn draft(bytes: &[u8]) -> VersionDraft {
        VersionDraft {
            content_hash: ContentHash::of(bytes),
            size: bytes.len() as u64,
            mimetype: "image/png".to_string(),
            filename: "held.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_turn_timeout_is_conflict() {
        let catalog = Catalog::in_memory(CatalogConfig::default().with_lock_timeout_ms(20));
        let asset = catalog
            .create(AssetMetadata::new("Held"), draft(b"one"))
            .await
            .unwrap();

        let slot = catalog.slot(asset.id).unwrap();
        let _held = slot.writer.lock().await;

        let err = catalog
            .append_version(asset.id, draft(b"two"))
            .await
            .unwrap_err();
        assert_eq!(err.condition(), ErrorCondition::Conflict);

        // Reads are not blocked by a held write turn.
        assert_eq!(catalog.versions(asset.id).await.unwrap().len(), 1);
        assert_eq!(catalog.get(asset.id).await.unwrap().version(), 1);
    }
}
