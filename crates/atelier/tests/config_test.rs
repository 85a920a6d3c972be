//! Configuration loading tests.

use atelier::AtelierConfig;
use std::io::Write;

#[test]
fn test_bundled_matches_defaults() {
    let bundled = AtelierConfig::bundled().expect("bundled config");
    assert_eq!(bundled, AtelierConfig::default());
}

#[test]
fn test_file_overrides_bundled_values() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("tempfile");
    writeln!(
        file,
        r#"
[storage]
root = "/srv/assets"

[renditions]
preview_size = 128

[server]
public_base_url = "https://assets.example.com"
"#
    )
    .expect("write config");

    let config = AtelierConfig::from_file(file.path()).expect("load");
    assert_eq!(config.storage().root().to_str(), Some("/srv/assets"));
    assert_eq!(*config.renditions().preview_size(), 128);
    assert_eq!(config.server().public_base_url(), "https://assets.example.com");

    // Untouched values keep their defaults
    let defaults = AtelierConfig::default();
    assert_eq!(
        config.storage().max_upload_bytes(),
        defaults.storage().max_upload_bytes()
    );
    assert_eq!(config.catalog(), defaults.catalog());
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("tempfile");
    writeln!(file, "[renditions]\npreview_size = \"large\"").expect("write config");

    let err = AtelierConfig::from_file(file.path()).unwrap_err();
    assert_eq!(err.condition(), atelier::ErrorCondition::Configuration);
}
