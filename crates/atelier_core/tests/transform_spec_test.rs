//! Tests for transform parameter validation and canonicalisation.

use atelier_core::{OutputFormat, TransformSpec};
use strum::IntoEnumIterator;

#[test]
fn test_dimension_bounds() {
    assert!(TransformSpec::default().with_width(1).validate().is_ok());
    assert!(TransformSpec::default().with_width(4096).with_height(4096).validate().is_ok());
    assert!(TransformSpec::default().with_width(0).validate().is_err());
    assert!(TransformSpec::default().with_height(4097).validate().is_err());
}

#[test]
fn test_quality_bounds() {
    assert!(TransformSpec::default().with_quality(1).validate().is_ok());
    assert!(TransformSpec::default().with_quality(100).validate().is_ok());
    assert!(TransformSpec::default().with_quality(0).validate().is_err());
    assert!(TransformSpec::default().with_quality(101).validate().is_err());
}

#[test]
fn test_format_allow_set() {
    for name in ["jpg", "jpeg", "png", "webp", "gif", "tiff", "bmp", "PNG"] {
        assert!(name.parse::<OutputFormat>().is_ok(), "{name} should parse");
    }
    for name in ["svg", "avif", "", "jpeg2000"] {
        assert!(name.parse::<OutputFormat>().is_err(), "{name} should be rejected");
    }
    assert_eq!(OutputFormat::iter().count(), 7);
}

#[test]
fn test_format_round_trips_through_display() {
    for format in OutputFormat::iter() {
        assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
    }
}

#[test]
fn test_mimetype_mapping() {
    assert_eq!(OutputFormat::from_mimetype("image/png"), Some(OutputFormat::Png));
    assert_eq!(OutputFormat::from_mimetype("image/jpeg; q=1"), Some(OutputFormat::Jpeg));
    assert_eq!(OutputFormat::from_mimetype("application/pdf"), None);
    assert_eq!(OutputFormat::Jpg.mimetype(), "image/jpeg");
}

#[test]
fn test_canonical_collapses_equivalent_requests() {
    let a = TransformSpec::default().with_width(100).with_format(OutputFormat::Jpg);
    let b = TransformSpec::default().with_width(100).with_format(OutputFormat::Jpeg);
    assert_eq!(a.canonical(), b.canonical());

    // crop is meaningless without both dimensions
    let cropped = TransformSpec::default().with_width(100).with_crop(true);
    assert!(!cropped.canonical().crop);
    let boxed = TransformSpec::default().with_width(100).with_height(50).with_crop(true);
    assert!(boxed.canonical().crop);

    // quality only matters for jpeg
    let png_low = TransformSpec::default().with_format(OutputFormat::Png).with_quality(10);
    let png_high = TransformSpec::default().with_format(OutputFormat::Png).with_quality(90);
    assert_eq!(png_low.canonical(), png_high.canonical());
}
