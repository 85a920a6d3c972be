//! Catalog configuration.

use atelier_core::MetadataPolicy;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the asset catalog.
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
pub struct CatalogConfig {
    /// How long a writer waits for an asset before reporting a conflict (milliseconds)
    #[serde(default = "default_lock_timeout_ms")]
    lock_timeout_ms: u64,

    /// Limits applied to asset metadata
    #[serde(default)]
    metadata: MetadataPolicy,
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            metadata: MetadataPolicy::default(),
        }
    }
}

impl CatalogConfig {
    /// Lock timeout as a [`Duration`].
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
