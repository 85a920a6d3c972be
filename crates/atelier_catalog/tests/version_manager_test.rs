//! Tests for storing uploads as versions.

use atelier_catalog::{Catalog, CatalogConfig, MetadataStore, VersionManager};
use atelier_core::{AssetId, AssetMetadata, ContentHash, Upload, VersionSelector};
use atelier_error::ErrorCondition;
use atelier_storage::{BlobStore, MemoryBlobStore};
use std::sync::Arc;

fn manager() -> (VersionManager, Arc<MemoryBlobStore>, Arc<Catalog>) {
    let blobs = Arc::new(MemoryBlobStore::new());
    let catalog = Arc::new(Catalog::in_memory(CatalogConfig::default()));
    let manager = VersionManager::new(blobs.clone(), catalog.clone(), 1024);
    (manager, blobs, catalog)
}

fn png(len: usize, fill: u8) -> Upload {
    Upload::new("logo.png", "image/png", vec![fill; len])
}

#[tokio::test]
async fn test_create_asset_stores_bytes_for_version_one() {
    let (manager, blobs, _) = manager();

    let asset = manager
        .create_asset(AssetMetadata::new("Logo"), png(120, 1))
        .await
        .unwrap();

    assert_eq!(asset.version(), 1);
    assert_eq!(asset.size(), 120);
    assert!(blobs.exists(&asset.current.content_hash).await.unwrap());

    let (version, bytes) = manager
        .read(asset.id, VersionSelector::Latest)
        .await
        .unwrap();
    assert_eq!(version, asset.current);
    assert_eq!(bytes, vec![1; 120]);
}

#[tokio::test]
async fn test_add_version_and_read_each_revision() {
    let (manager, _, _) = manager();
    let asset = manager
        .create_asset(AssetMetadata::new("Logo"), png(120, 1))
        .await
        .unwrap();

    let v2 = manager.add_version(asset.id, png(200, 2)).await.unwrap();

    assert_eq!(v2.number, 2);
    let numbers: Vec<u32> = manager
        .list_versions(asset.id)
        .await
        .unwrap()
        .iter()
        .map(|v| v.number)
        .collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(
        manager
            .get_version(asset.id, VersionSelector::Latest)
            .await
            .unwrap()
            .number,
        2
    );

    let (_, first) = manager.read(asset.id, 1.into()).await.unwrap();
    let (_, second) = manager.read(asset.id, 2.into()).await.unwrap();
    assert_eq!(first.len(), 120);
    assert_eq!(second.len(), 200);
}

#[tokio::test]
async fn test_identical_revisions_share_a_blob() {
    let (manager, blobs, _) = manager();
    let asset = manager
        .create_asset(AssetMetadata::new("Logo"), png(64, 9))
        .await
        .unwrap();

    let v2 = manager.add_version(asset.id, png(64, 9)).await.unwrap();

    assert_eq!(v2.number, 2);
    assert_eq!(v2.content_hash, asset.current.content_hash);
    assert_eq!(blobs.usage().await.unwrap().blobs, 1);
}

#[tokio::test]
async fn test_add_version_to_unknown_asset_stores_nothing() {
    let (manager, blobs, _) = manager();

    let err = manager
        .add_version(AssetId::new(), png(10, 1))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(blobs.usage().await.unwrap().blobs, 0);
}

#[tokio::test]
async fn test_invalid_uploads_are_rejected_before_storage() {
    let (manager, blobs, catalog) = manager();

    let too_big = manager
        .create_asset(AssetMetadata::new("Big"), png(1025, 1))
        .await
        .unwrap_err();
    let empty = manager
        .create_asset(AssetMetadata::new("Empty"), png(0, 1))
        .await
        .unwrap_err();
    let bad_mime = manager
        .create_asset(
            AssetMetadata::new("Odd"),
            Upload::new("logo.png", "png", vec![1]),
        )
        .await
        .unwrap_err();
    let bad_title = manager
        .create_asset(AssetMetadata::new(""), png(10, 1))
        .await
        .unwrap_err();

    for err in [too_big, empty, bad_mime, bad_title] {
        assert_eq!(err.condition(), ErrorCondition::Validation);
    }
    assert_eq!(blobs.usage().await.unwrap().blobs, 0);
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn test_missing_blob_reads_as_storage_failure() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let catalog = Arc::new(Catalog::in_memory(CatalogConfig::default()));
    let manager = VersionManager::new(blobs, catalog.clone(), 1024);

    // A record whose bytes were never stored.
    let asset = catalog
        .create(
            AssetMetadata::new("Orphan"),
            atelier_core::VersionDraft {
                content_hash: ContentHash::of(b"never stored"),
                size: 12,
                mimetype: "image/png".to_string(),
                filename: "orphan.png".to_string(),
            },
        )
        .await
        .unwrap();

    let err = manager
        .read(asset.id, VersionSelector::Latest)
        .await
        .unwrap_err();

    assert_eq!(err.condition(), ErrorCondition::StorageRead);
}
