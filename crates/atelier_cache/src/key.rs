//! Rendition identity and payload.

use atelier_core::{ContentHash, OutputFormat, TransformSpec};
use std::fmt;
use std::sync::Arc;

/// Identity of a derived rendition.
///
/// The source is identified by its content hash, the immutable identity of a
/// version's bytes. The transform spec is held in canonical form with the
/// output format resolved, so requests that differ only in ignored parameters
/// share one entry, as do versions with identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenditionKey {
    source: ContentHash,
    spec: TransformSpec,
}

impl RenditionKey {
    /// Key for rendering `source` in `format` with `spec`.
    pub fn new(source: ContentHash, spec: &TransformSpec, format: OutputFormat) -> Self {
        Self {
            source,
            spec: spec.with_format(format).canonical(),
        }
    }

    /// Content hash of the source bytes.
    pub fn source(&self) -> &ContentHash {
        &self.source
    }

    /// Canonical transform spec.
    pub fn spec(&self) -> &TransformSpec {
        &self.spec
    }

    /// Resolved output format.
    pub fn format(&self) -> OutputFormat {
        self.spec.format.unwrap_or(OutputFormat::Png).canonical()
    }
}

impl fmt::Display for RenditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = |d: Option<u32>| d.map(|v| v.to_string()).unwrap_or_else(|| "_".to_string());
        write!(
            f,
            "{}/{}x{}{}.{}@q{}",
            self.source,
            dim(self.spec.width),
            dim(self.spec.height),
            if self.spec.crop { "c" } else { "" },
            self.format(),
            self.spec.quality
        )
    }
}

/// A derived, immutable rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    key: RenditionKey,
    content_hash: ContentHash,
    bytes: Arc<[u8]>,
}

impl Rendition {
    /// Wrap encoded output.
    pub fn new(key: RenditionKey, bytes: Vec<u8>) -> Self {
        Self {
            content_hash: ContentHash::of(&bytes),
            key,
            bytes: Arc::from(bytes),
        }
    }

    /// Key the rendition was derived for.
    pub fn key(&self) -> &RenditionKey {
        &self.key
    }

    /// Hash of the encoded output.
    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type of the encoded bytes.
    pub fn mimetype(&self) -> &'static str {
        self.key.format().mimetype()
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the encoded output is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
