//! Resolvable URLs for assets and versions.

use atelier_core::AssetId;

/// Builds the URLs returned in responses.
///
/// ```
/// use atelier::UrlBuilder;
/// use atelier_core::AssetId;
///
/// let urls = UrlBuilder::new("https://assets.example.com/");
/// let id = AssetId::new();
/// assert_eq!(
///     urls.version(id, 2),
///     format!("https://assets.example.com/assets/{}/versions/2", id)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base: String,
}

impl UrlBuilder {
    /// Create a builder rooted at `base` (a trailing slash is ignored).
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Download URL of an asset's current version.
    pub fn download(&self, id: AssetId) -> String {
        format!("{}/assets/{}/download", self.base, id)
    }

    /// Download URL of a specific version.
    pub fn version(&self, id: AssetId, number: u32) -> String {
        format!("{}/assets/{}/versions/{}", self.base, id, number)
    }
}
