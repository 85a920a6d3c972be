//! Wire shape of responses.

use atelier::{AssetResponse, BulkItemError, UrlBuilder, VersionResponse};
use atelier_core::{Asset, AssetId, AssetMetadata, ContentHash, Version};
use atelier_error::{NotFoundError, NotFoundErrorKind};
use chrono::{TimeZone, Utc};

fn sample_asset() -> Asset {
    let id = AssetId::new();
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    let updated = created + chrono::Duration::microseconds(1_500);
    Asset {
        id,
        metadata: AssetMetadata::new("Logo").with_tags(["brand"]),
        created_at: created,
        updated_at: updated,
        current: Version {
            asset_id: id,
            number: 1,
            content_hash: ContentHash::of(b"logo"),
            size: 4,
            mimetype: "image/png".to_string(),
            filename: "logo.png".to_string(),
            created_at: created,
        },
    }
}

#[test]
fn test_asset_response_fields_and_timestamps() {
    let asset = sample_asset();
    let urls = UrlBuilder::new("http://localhost:8000");
    let response = AssetResponse::new(&asset, &urls);

    let json = serde_json::to_value(&response).expect("serialize");
    assert_eq!(json["id"], asset.id.to_string());
    assert_eq!(json["filename"], "logo.png");
    assert_eq!(json["version"], 1);
    assert_eq!(json["size"], 4);
    assert_eq!(json["mimetype"], "image/png");
    assert_eq!(json["metadata"]["title"], "Logo");
    assert_eq!(json["created_at"], "2024-05-01T12:30:00.000000Z");
    assert_eq!(json["updated_at"], "2024-05-01T12:30:00.001500Z");
    assert_eq!(
        json["url"],
        format!("http://localhost:8000/assets/{}/download", asset.id)
    );
}

#[test]
fn test_version_response_url() {
    let asset = sample_asset();
    let urls = UrlBuilder::new("http://localhost:8000/");
    let response = VersionResponse::new(&asset.current, &urls);
    assert_eq!(
        response.url,
        format!("http://localhost:8000/assets/{}/versions/1", asset.id)
    );
}

#[test]
fn test_bulk_error_carries_condition_code() {
    let err: atelier::AtelierError =
        NotFoundError::new(NotFoundErrorKind::Asset("abc".to_string())).into();
    let item = BulkItemError::from(&err);
    assert_eq!(item.condition, "not_found");
    assert!(!item.message.is_empty());
}
