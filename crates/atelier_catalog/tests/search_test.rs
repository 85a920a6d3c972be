//! Tests for filtered listings and the tag catalogue.

use atelier_catalog::{Catalog, CatalogConfig, MetadataStore};
use atelier_core::{
    Asset, AssetMetadata, AssetQuery, ContentHash, MetadataPatch, PageRequest, VersionDraft,
};
use atelier_error::ErrorCondition;

fn draft(seed: &str, mimetype: &str) -> VersionDraft {
    VersionDraft {
        content_hash: ContentHash::of(seed.as_bytes()),
        size: seed.len() as u64,
        mimetype: mimetype.to_string(),
        filename: format!("{}.bin", seed),
    }
}

async fn create(
    catalog: &Catalog,
    title: &str,
    description: Option<&str>,
    tags: &[&str],
    mimetype: &str,
) -> Asset {
    let mut metadata = AssetMetadata::new(title).with_tags(tags.iter().copied());
    if let Some(description) = description {
        metadata = metadata.with_description(description);
    }
    catalog.create(metadata, draft(title, mimetype)).await.unwrap()
}

async fn seeded() -> (Catalog, Vec<Asset>) {
    let catalog = Catalog::in_memory(CatalogConfig::default());
    let assets = vec![
        create(&catalog, "Logo", Some("Primary brand mark"), &["brand", "logo"], "image/png").await,
        create(&catalog, "Banner", None, &["brand", "web"], "image/jpeg").await,
        create(&catalog, "Icon", Some("Small logo variant"), &["logo"], "image/png").await,
        create(&catalog, "Manual", Some("Brand guidelines"), &["docs"], "application/pdf").await,
    ];
    (catalog, assets)
}

fn titles(page: &atelier_core::Page<Asset>) -> Vec<&str> {
    page.items.iter().map(|a| a.metadata.title.as_str()).collect()
}

#[tokio::test]
async fn test_unfiltered_query_is_newest_first() {
    let (catalog, _) = seeded().await;

    let page = catalog.list(&AssetQuery::new()).await.unwrap();

    assert_eq!(titles(&page), vec!["Manual", "Icon", "Banner", "Logo"]);
    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn test_text_matches_title_or_description_case_insensitively() {
    let (catalog, _) = seeded().await;

    let page = catalog
        .list(&AssetQuery::new().with_text("LOGO"))
        .await
        .unwrap();

    assert_eq!(titles(&page), vec!["Icon", "Logo"]);
}

#[tokio::test]
async fn test_filters_are_conjunctive() {
    let (catalog, _) = seeded().await;

    let brand_png = catalog
        .list(&AssetQuery::new().with_tag("brand").with_mimetype("image/png"))
        .await
        .unwrap();
    let two_tags = catalog
        .list(&AssetQuery::new().with_tag("brand").with_tag("logo"))
        .await
        .unwrap();
    let text_and_tag = catalog
        .list(&AssetQuery::new().with_text("brand").with_tag("docs"))
        .await
        .unwrap();
    let nothing = catalog
        .list(&AssetQuery::new().with_tag("brand").with_tag("docs"))
        .await
        .unwrap();

    assert_eq!(titles(&brand_png), vec!["Logo"]);
    assert_eq!(titles(&two_tags), vec!["Logo"]);
    assert_eq!(titles(&text_and_tag), vec!["Manual"]);
    assert!(nothing.items.is_empty());
    assert_eq!(nothing.total, 0);
}

#[tokio::test]
async fn test_unknown_tag_matches_nothing() {
    let (catalog, _) = seeded().await;

    let page = catalog
        .list(&AssetQuery::new().with_tag("missing"))
        .await
        .unwrap();

    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_empty_filters_are_ignored() {
    let (catalog, _) = seeded().await;

    let page = catalog
        .list(&AssetQuery::new().with_text("  ").with_mimetype(""))
        .await
        .unwrap();

    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn test_pagination_reports_total() {
    let (catalog, _) = seeded().await;

    let first = catalog
        .list(&AssetQuery::new().with_page(1, 3))
        .await
        .unwrap();
    let second = catalog
        .list(&AssetQuery::new().with_page(2, 3))
        .await
        .unwrap();
    let beyond = catalog
        .list(&AssetQuery::new().with_page(5, 3))
        .await
        .unwrap();

    assert_eq!(titles(&first), vec!["Manual", "Icon", "Banner"]);
    assert_eq!(titles(&second), vec!["Logo"]);
    assert!(beyond.items.is_empty());
    for page in [&first, &second, &beyond] {
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages(), 2);
    }
}

#[tokio::test]
async fn test_out_of_range_page_is_rejected() {
    let (catalog, _) = seeded().await;

    for (page, size) in [(0, 20), (1, 0), (1, 101)] {
        let err = catalog
            .list(&AssetQuery::new().with_page(page, size))
            .await
            .unwrap_err();
        assert_eq!(err.condition(), ErrorCondition::Validation);
    }
}

#[tokio::test]
async fn test_index_follows_metadata_and_version_changes() {
    let (catalog, assets) = seeded().await;
    let banner = &assets[1];

    catalog
        .update_metadata(banner.id, MetadataPatch::tags(["web"]))
        .await
        .unwrap();
    catalog
        .append_version(banner.id, draft("banner-v2", "image/png"))
        .await
        .unwrap();

    let brand = catalog
        .list(&AssetQuery::new().with_tag("brand"))
        .await
        .unwrap();
    let png = catalog
        .list(&AssetQuery::new().with_mimetype("image/png"))
        .await
        .unwrap();

    assert_eq!(titles(&brand), vec!["Logo"]);
    // Order is by creation time, so the edited asset keeps its place.
    assert_eq!(titles(&png), vec!["Icon", "Banner", "Logo"]);
    assert_eq!(png.items[1].version(), 2);
}

#[tokio::test]
async fn test_tag_catalogue_counts_assets() {
    let (catalog, _) = seeded().await;

    let all = catalog.tags(None, PageRequest::default()).await.unwrap();
    let filtered = catalog
        .tags(Some("LO"), PageRequest::default())
        .await
        .unwrap();

    let counts: Vec<(&str, u64)> = all
        .items
        .iter()
        .map(|t| (t.name.as_str(), t.assets))
        .collect();
    assert_eq!(
        counts,
        vec![("brand", 2), ("docs", 1), ("logo", 2), ("web", 1)]
    );
    assert_eq!(filtered.items.len(), 1);
    assert_eq!(filtered.items[0].name, "logo");
}

#[tokio::test]
async fn test_unused_tags_leave_the_catalogue() {
    let (catalog, assets) = seeded().await;

    catalog
        .update_metadata(assets[3].id, MetadataPatch::tags(Vec::<String>::new()))
        .await
        .unwrap();

    let all = catalog.tags(None, PageRequest::default()).await.unwrap();
    assert!(all.items.iter().all(|t| t.name != "docs"));
    assert_eq!(all.total, 3);
}
