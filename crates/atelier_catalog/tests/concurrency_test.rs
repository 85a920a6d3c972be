//! Tests for racing writers.

use atelier_catalog::{Catalog, CatalogConfig, MetadataStore};
use atelier_core::{AssetMetadata, ContentHash, VersionDraft};
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn draft(i: usize) -> VersionDraft {
    let bytes = format!("revision {}", i);
    VersionDraft {
        content_hash: ContentHash::of(bytes.as_bytes()),
        size: bytes.len() as u64,
        mimetype: "image/png".to_string(),
        filename: format!("rev-{}.png", i),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_get_distinct_consecutive_numbers() {
    let catalog = Arc::new(Catalog::in_memory(CatalogConfig::default()));
    let asset = catalog
        .create(AssetMetadata::new("Contended"), draft(0))
        .await
        .unwrap();

    const WRITERS: usize = 50;
    let mut handles = Vec::new();
    for i in 1..=WRITERS {
        let catalog = Arc::clone(&catalog);
        let delay = rand::thread_rng().gen_range(0..5);
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            catalog.append_version(asset.id, draft(i)).await.unwrap()
        }));
    }

    let mut numbers = BTreeSet::new();
    for handle in handles {
        let version = handle.await.unwrap();
        assert!(numbers.insert(version.number), "duplicate number {}", version.number);
    }

    let expected: BTreeSet<u32> = (2..=WRITERS as u32 + 1).collect();
    assert_eq!(numbers, expected);

    let versions = catalog.versions(asset.id).await.unwrap();
    assert_eq!(versions.len(), WRITERS + 1);
    assert!(
        versions
            .iter()
            .enumerate()
            .all(|(i, v)| v.number == i as u32 + 1)
    );
    assert!(versions.windows(2).all(|w| w[0].created_at < w[1].created_at));
    assert_eq!(
        catalog.get(asset.id).await.unwrap().version(),
        WRITERS as u32 + 1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_are_independent() {
    let catalog = Arc::new(Catalog::in_memory(CatalogConfig::default()));

    let mut handles = Vec::new();
    for i in 0..20 {
        let catalog = Arc::clone(&catalog);
        handles.push(tokio::spawn(async move {
            catalog
                .create(AssetMetadata::new(format!("Asset {}", i)), draft(i))
                .await
                .unwrap()
        }));
    }

    let mut ids = BTreeSet::new();
    for handle in handles {
        let asset = handle.await.unwrap();
        assert_eq!(asset.version(), 1);
        ids.insert(asset.id);
    }

    assert_eq!(ids.len(), 20);
    assert_eq!(catalog.len(), 20);
    let page = catalog
        .list(&atelier_core::AssetQuery::new().with_page(1, 100))
        .await
        .unwrap();
    assert_eq!(page.total, 20);
    assert!(
        page.items
            .windows(2)
            .all(|w| w[0].created_at > w[1].created_at)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_appends_to_different_assets_interleave() {
    let catalog = Arc::new(Catalog::in_memory(CatalogConfig::default()));
    let mut assets = Vec::new();
    for i in 0..4 {
        assets.push(
            catalog
                .create(AssetMetadata::new(format!("Asset {}", i)), draft(i))
                .await
                .unwrap(),
        );
    }

    let mut handles = Vec::new();
    for asset in &assets {
        for i in 0..10 {
            let catalog = Arc::clone(&catalog);
            let id = asset.id;
            handles.push(tokio::spawn(async move {
                catalog.append_version(id, draft(100 + i)).await.unwrap()
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for asset in &assets {
        let versions = catalog.versions(asset.id).await.unwrap();
        let numbers: Vec<u32> = versions.iter().map(|v| v.number).collect();
        assert_eq!(numbers, (1..=11).collect::<Vec<_>>());
    }
}
