//! Rendition cache for Atelier.
//!
//! Renditions are resized or re-encoded images derived from an asset
//! version. They are computed on first request, cached under a
//! [`RenditionKey`] (source content hash plus canonical transform spec), and
//! evicted under byte-budget or age pressure. Eviction never touches source
//! versions or blobs; a miss after eviction simply derives again.
//!
//! The codec is pluggable through [`Transformer`]; [`ImageTransformer`] is
//! the implementation backed by the `image` crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod key;
mod lru;
mod transformer;

pub use cache::{CacheStats, RenditionCache};
pub use config::{RenditionCacheConfig, RenditionCacheConfigBuilder};
pub use key::{Rendition, RenditionKey};
pub use transformer::{ImageTransformer, Transformer};
