//! Atelier: a versioned asset store.
//!
//! Uploaded files are stored as content-addressed blobs, bound to assets as
//! gapless numbered versions, described by validated metadata, listed through
//! a conjunctive search index, and rendered on demand into cached image
//! renditions.
//!
//! This crate is the facade. It re-exports the component crates and provides
//! [`AssetService`], the response shapes callers see, configuration loading,
//! and logging initialisation.
//!
//! # Example
//!
//! ```rust,no_run
//! use atelier::{AssetService, AtelierConfig};
//! use atelier_core::{AssetMetadata, OutputFormat, TransformSpec, Upload, VersionSelector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AtelierConfig::load()?;
//! let service = AssetService::open(&config).await?;
//!
//! let bytes = std::fs::read("logo.png")?;
//! let asset = service
//!     .create_asset(AssetMetadata::new("Logo"), Upload::new("logo.png", "image/png", bytes))
//!     .await?;
//!
//! let spec = TransformSpec::default().with_width(100).with_format(OutputFormat::Webp);
//! let thumbnail = service.transform(asset.id, VersionSelector::Latest, spec).await?;
//! println!("{} bytes", thumbnail.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod observability;
mod response;
mod service;
mod urls;

pub use config::{
    AtelierConfig, ServerConfig, ServerConfigBuilder, StorageConfig, StorageConfigBuilder,
};
pub use observability::{ObservabilityConfig, init_observability, init_observability_with_config};
pub use response::{
    AssetListResponse, AssetResponse, BulkItemError, BulkItemResult, Download,
    VersionListResponse, VersionResponse,
};
pub use service::{AssetService, NewAsset};
pub use urls::UrlBuilder;

// Re-export component crates
pub use atelier_cache::{Rendition, RenditionCache, RenditionCacheConfig};
pub use atelier_catalog::{Catalog, CatalogConfig, MetadataStore, VersionManager};
pub use atelier_error::{AtelierError, AtelierErrorKind, AtelierResult, ErrorCondition};
pub use atelier_storage::{BlobStore, BlobUsage, FileSystemBlobStore, MemoryBlobStore};
