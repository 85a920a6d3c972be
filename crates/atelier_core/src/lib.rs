//! Core data types for the Atelier asset store.
//!
//! This crate provides the data model shared by every component: asset and
//! version records, content hashes, metadata and its validation policy,
//! transform specifications, and query/page types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod ids;
mod metadata;
mod query;
pub mod timestamp;
mod transform;

pub use asset::{Asset, Upload, Version, VersionDraft, VersionSelector, validate_mimetype};
pub use ids::{AssetId, ContentHash};
pub use metadata::{
    AssetMetadata, MetadataPatch, MetadataPolicy, MetadataPolicyBuilder, parse_tag_list,
};
pub use query::{AssetQuery, MAX_PAGE_SIZE, Page, PageRequest, TagCount};
pub use transform::{MAX_DIMENSION, OutputFormat, TransformSpec};
