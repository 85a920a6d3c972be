//! Asset catalog for Atelier.
//!
//! The catalog is the authoritative record of every asset, its ordered and
//! gapless version history, and its descriptive metadata. It also maintains
//! the search index used for filtered listings and the tag catalogue.
//!
//! # Components
//!
//! - [`MetadataStore`]: the store contract
//! - [`Catalog`]: default implementation, in memory or backed by a record directory
//! - [`SearchIndex`]: filtered, paginated queries over current asset views
//! - [`VersionManager`]: stores upload bytes and binds them to versions
//!
//! # Concurrency
//!
//! Each asset has its own write turn. Writes to one asset are linearized
//! (version numbers are assigned inside the turn) while writes to different
//! assets never contend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod clock;
mod config;
mod index;
mod records;
mod store;
mod versions;

pub use catalog::Catalog;
pub use clock::MonotonicClock;
pub use config::{CatalogConfig, CatalogConfigBuilder};
pub use index::SearchIndex;
pub use records::{AssetRecord, RecordDir};
pub use store::MetadataStore;
pub use versions::VersionManager;
