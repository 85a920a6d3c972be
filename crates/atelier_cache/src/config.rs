//! Rendition cache configuration.

use atelier_core::{OutputFormat, TransformSpec};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the rendition cache.
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
pub struct RenditionCacheConfig {
    /// Total bytes of cached renditions before least-recently-used eviction
    #[serde(default = "default_byte_budget")]
    byte_budget: u64,

    /// Age after which a cached rendition is dropped (seconds)
    #[serde(default = "default_max_age_secs")]
    max_age_secs: u64,

    /// Transforms allowed to run at once
    #[serde(default = "default_max_concurrent_transforms")]
    max_concurrent_transforms: usize,

    /// Extra attempts after a transient transform failure
    #[serde(default = "default_transform_retries")]
    transform_retries: usize,

    /// Delay before the first retry, doubling afterwards (milliseconds)
    #[serde(default = "default_retry_initial_backoff_ms")]
    retry_initial_backoff_ms: u64,

    /// Preview width when the caller gives no dimensions
    #[serde(default = "default_preview_size")]
    preview_size: u32,

    /// Preview output format
    #[serde(default = "default_preview_format")]
    preview_format: OutputFormat,
}

fn default_byte_budget() -> u64 {
    256 * 1024 * 1024
}

fn default_max_age_secs() -> u64 {
    3600
}

fn default_max_concurrent_transforms() -> usize {
    4
}

fn default_transform_retries() -> usize {
    2
}

fn default_retry_initial_backoff_ms() -> u64 {
    50
}

fn default_preview_size() -> u32 {
    256
}

fn default_preview_format() -> OutputFormat {
    OutputFormat::Webp
}

impl Default for RenditionCacheConfig {
    fn default() -> Self {
        Self {
            byte_budget: default_byte_budget(),
            max_age_secs: default_max_age_secs(),
            max_concurrent_transforms: default_max_concurrent_transforms(),
            transform_retries: default_transform_retries(),
            retry_initial_backoff_ms: default_retry_initial_backoff_ms(),
            preview_size: default_preview_size(),
            preview_format: default_preview_format(),
        }
    }
}

impl RenditionCacheConfig {
    /// Maximum entry age as a [`Duration`].
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Transform used for previews.
    ///
    /// Without dimensions the preview fits the configured width, keeping the
    /// source aspect ratio.
    pub fn preview_spec(&self, width: Option<u32>, height: Option<u32>) -> TransformSpec {
        let spec = TransformSpec {
            width,
            height,
            ..TransformSpec::default()
        }
        .with_format(self.preview_format);
        match (width, height) {
            (None, None) => spec.with_width(self.preview_size),
            _ => spec,
        }
    }
}
