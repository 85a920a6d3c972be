//! Tests for the durable catalog.

use atelier_catalog::{Catalog, CatalogConfig, MetadataStore};
use atelier_core::{AssetMetadata, AssetQuery, ContentHash, MetadataPatch, VersionDraft};
use atelier_error::ErrorCondition;
use tempfile::TempDir;

fn draft(bytes: &[u8]) -> VersionDraft {
    VersionDraft {
        content_hash: ContentHash::of(bytes),
        size: bytes.len() as u64,
        mimetype: "image/png".to_string(),
        filename: "logo.png".to_string(),
    }
}

#[tokio::test]
async fn test_reopen_restores_assets_versions_and_index() {
    let temp_dir = TempDir::new().unwrap();

    let (logo, banner) = {
        let catalog = Catalog::open(temp_dir.path(), CatalogConfig::default())
            .await
            .unwrap();
        assert!(catalog.is_durable());

        let logo = catalog
            .create(AssetMetadata::new("Logo").with_tags(["brand"]), draft(b"v1"))
            .await
            .unwrap();
        catalog.append_version(logo.id, draft(b"v2")).await.unwrap();
        catalog
            .update_metadata(logo.id, MetadataPatch::tags(["brand", "dark"]))
            .await
            .unwrap();
        let banner = catalog
            .create(AssetMetadata::new("Banner"), draft(b"banner"))
            .await
            .unwrap();
        (
            catalog.get(logo.id).await.unwrap(),
            catalog.get(banner.id).await.unwrap(),
        )
    };

    let reopened = Catalog::open(temp_dir.path(), CatalogConfig::default())
        .await
        .unwrap();

    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get(logo.id).await.unwrap(), logo);
    assert_eq!(reopened.get(banner.id).await.unwrap(), banner);

    let numbers: Vec<u32> = reopened
        .versions(logo.id)
        .await
        .unwrap()
        .iter()
        .map(|v| v.number)
        .collect();
    assert_eq!(numbers, vec![1, 2]);

    let page = reopened
        .list(&AssetQuery::new().with_tag("dark"))
        .await
        .unwrap();
    assert_eq!(page.items, vec![logo.clone()]);

    // Numbering and timestamps continue after a restart.
    let v3 = reopened.append_version(logo.id, draft(b"v3")).await.unwrap();
    assert_eq!(v3.number, 3);
    assert!(v3.created_at > logo.updated_at);
}

#[tokio::test]
async fn test_failed_create_leaves_nothing_behind() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::open(temp_dir.path(), CatalogConfig::default())
        .await
        .unwrap();

    let err = catalog
        .create(AssetMetadata::new(""), draft(b"v1"))
        .await
        .unwrap_err();
    assert_eq!(err.condition(), ErrorCondition::Validation);

    let files = std::fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(files, 0);
}

#[tokio::test]
async fn test_open_removes_interrupted_writes() {
    let temp_dir = TempDir::new().unwrap();
    let leftover = temp_dir.path().join("partial.json.0123abcd.tmp");
    std::fs::write(&leftover, b"{\"asset\":").unwrap();

    let catalog = Catalog::open(temp_dir.path(), CatalogConfig::default())
        .await
        .unwrap();

    assert!(catalog.is_empty());
    assert!(!leftover.exists());
}

#[tokio::test]
async fn test_open_rejects_corrupted_record() {
    let temp_dir = TempDir::new().unwrap();
    {
        let catalog = Catalog::open(temp_dir.path(), CatalogConfig::default())
            .await
            .unwrap();
        catalog
            .create(AssetMetadata::new("Logo"), draft(b"v1"))
            .await
            .unwrap();
    }
    let record = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    std::fs::write(&record, b"not json").unwrap();

    let err = Catalog::open(temp_dir.path(), CatalogConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.condition(), ErrorCondition::StorageRead);
}
