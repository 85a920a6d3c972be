//! Tests for metadata validation and patch semantics.

use atelier_core::{AssetMetadata, MetadataPatch, MetadataPolicy, MetadataPolicyBuilder};
use atelier_error::ValidationErrorKind;
use serde_json::json;

fn custom(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_title_bounds() {
    let policy = MetadataPolicy::default();

    assert!(policy.validate(&AssetMetadata::new("L")).is_ok());
    assert!(policy.validate(&AssetMetadata::new("x".repeat(256))).is_ok());

    let empty = policy.validate(&AssetMetadata::new("")).unwrap_err();
    assert_eq!(
        empty.kind(),
        &ValidationErrorKind::MissingField("title".to_string())
    );

    let long = policy.validate(&AssetMetadata::new("x".repeat(257))).unwrap_err();
    assert!(matches!(long.kind(), ValidationErrorKind::OutOfRange { max: 256, .. }));
}

#[test]
fn test_title_counts_characters_not_bytes() {
    let policy = MetadataPolicy::default();
    // 256 two-byte characters
    assert!(policy.validate(&AssetMetadata::new("é".repeat(256))).is_ok());
}

#[test]
fn test_description_limit() {
    let policy = MetadataPolicy::default();
    let ok = AssetMetadata::new("Logo").with_description("d".repeat(1024));
    let too_long = AssetMetadata::new("Logo").with_description("d".repeat(1025));

    assert!(policy.validate(&ok).is_ok());
    assert!(policy.validate(&too_long).is_err());
}

#[test]
fn test_tag_rules() {
    let policy = MetadataPolicy::default();

    assert!(policy.validate(&AssetMetadata::new("a").with_tags(["brand", "logo"])).is_ok());
    assert!(policy.validate(&AssetMetadata::new("a").with_tags([""])).is_err());
    assert!(policy.validate(&AssetMetadata::new("a").with_tags(["a,b"])).is_err());
    assert!(policy.validate(&AssetMetadata::new("a").with_tags([" padded"])).is_err());
    assert!(policy.validate(&AssetMetadata::new("a").with_tags(["t".repeat(65)])).is_err());

    let strict = MetadataPolicyBuilder::default().max_tags(1).build().unwrap();
    assert!(strict.validate(&AssetMetadata::new("a").with_tags(["x", "y"])).is_err());
}

#[test]
fn test_custom_depth_and_keys() {
    let policy = MetadataPolicy::default().with_custom_max_depth(2).with_custom_max_keys(3);

    let flat = AssetMetadata::new("a").with_custom(custom(json!({"a": 1, "b": "two"})));
    assert!(policy.validate(&flat).is_ok());

    let nested_ok = AssetMetadata::new("a").with_custom(custom(json!({"a": {"b": 1}})));
    assert!(policy.validate(&nested_ok).is_ok());

    let too_deep = AssetMetadata::new("a").with_custom(custom(json!({"a": {"b": {"c": 1}}})));
    let err = policy.validate(&too_deep).unwrap_err();
    assert!(matches!(err.kind(), ValidationErrorKind::OutOfRange { field, .. } if field == "custom.depth"));

    let too_many = AssetMetadata::new("a").with_custom(custom(json!({"a": 1, "b": 2, "c": {"d": 3}})));
    let err = policy.validate(&too_many).unwrap_err();
    assert!(matches!(err.kind(), ValidationErrorKind::OutOfRange { field, .. } if field == "custom.keys"));
}

#[test]
fn test_custom_serialized_size() {
    let policy = MetadataPolicy::default().with_custom_max_bytes(32);
    let big = AssetMetadata::new("a").with_custom(custom(json!({"blob": "x".repeat(64)})));
    assert!(policy.validate(&big).is_err());
}

#[test]
fn test_patch_merges_only_supplied_fields() {
    let current = AssetMetadata::new("Logo")
        .with_description("primary mark")
        .with_tags(["brand"])
        .with_custom(custom(json!({"owner": "design"})));

    let patch = MetadataPatch {
        title: Some("Logo v2".to_string()),
        ..Default::default()
    };
    let merged = patch.apply(&current);

    assert_eq!(merged.title, "Logo v2");
    assert_eq!(merged.description.as_deref(), Some("primary mark"));
    assert_eq!(merged.tags, current.tags);
    assert_eq!(merged.custom, current.custom);
}

#[test]
fn test_patch_replaces_tags_wholesale_and_clears_description() {
    let current = AssetMetadata::new("Logo")
        .with_description("primary mark")
        .with_tags(["brand", "old"]);

    let patch = MetadataPatch {
        description: Some(None),
        tags: Some(["new".to_string()].into_iter().collect()),
        ..Default::default()
    };
    let merged = patch.apply(&current);

    assert_eq!(merged.description, None);
    assert_eq!(merged.tags.into_iter().collect::<Vec<_>>(), vec!["new"]);
    assert!(MetadataPatch::default().is_empty());
    assert!(!patch.is_empty());
}

#[test]
fn test_text_matching_is_case_insensitive() {
    let meta = AssetMetadata::new("Company Logo").with_description("Used on the HOMEPAGE");
    assert!(meta.matches_text("logo"));
    assert!(meta.matches_text("homepage"));
    assert!(!meta.matches_text("banner"));
}
