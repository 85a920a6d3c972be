//! Application configuration.
//!
//! Configuration is layered with the `config` crate:
//! - Bundled defaults (include_str! from atelier.toml)
//! - User overrides (~/.config/atelier/atelier.toml, then ./atelier.toml)
//! - `ATELIER__<SECTION>__<KEY>` environment variables
//!
//! Later sources override earlier ones.

use crate::ObservabilityConfig;
use atelier_cache::RenditionCacheConfig;
use atelier_catalog::CatalogConfig;
use atelier_error::{AtelierError, AtelierResult, ConfigError};
use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../atelier.toml");

/// Where asset data lives and how large uploads may be.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct StorageConfig {
    /// Data directory
    #[serde(default = "default_root")]
    #[setters(into)]
    root: PathBuf,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    max_upload_bytes: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from("atelier-data")
}

fn default_max_upload_bytes() -> u64 {
    100 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl StorageConfig {
    /// Directory holding content-addressed blobs.
    pub fn blobs_dir(&self) -> PathBuf {
        self.root.join("blobs")
    }

    /// Directory holding asset records.
    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join("catalog")
    }
}

/// Settings for the outward-facing surface.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_", into)]
#[builder(default)]
pub struct ServerConfig {
    /// Base of resolvable URLs in responses
    #[serde(default = "default_public_base_url")]
    public_base_url: String,
}

fn default_public_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
        }
    }
}

/// Top-level Atelier configuration.
///
/// # Example
///
/// ```no_run
/// use atelier::AtelierConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AtelierConfig::load()?;
/// println!("Data in {}", config.storage().root().display());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct AtelierConfig {
    /// Blob and record storage
    #[serde(default)]
    storage: StorageConfig,

    /// Catalog behaviour and metadata limits
    #[serde(default)]
    catalog: CatalogConfig,

    /// Rendition cache
    #[serde(default)]
    renditions: RenditionCacheConfig,

    /// Public surface
    #[serde(default)]
    server: ServerConfig,

    /// Log output
    #[serde(default)]
    logging: ObservabilityConfig,
}

fn build(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> AtelierResult<AtelierConfig> {
    builder
        .build()
        .map_err(|e| {
            AtelierError::from(ConfigError::new(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?
        .try_deserialize()
        .map_err(|e| {
            AtelierError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
}

impl AtelierConfig {
    /// Bundled defaults only.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bundled file is malformed.
    pub fn bundled() -> AtelierResult<Self> {
        build(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load bundled defaults overlaid with a specific file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> AtelierResult<Self> {
        debug!("Loading configuration from file");
        build(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from(path.as_ref())),
        )
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any present source is malformed.
    #[instrument]
    pub fn load() -> AtelierResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/atelier/atelier.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("atelier").required(false))
            .add_source(
                Environment::with_prefix("ATELIER")
                    .separator("__")
                    .try_parsing(true),
            );

        build(builder)
    }
}
