//! Content-addressed blob storage for Atelier.
//!
//! Blobs are immutable byte payloads keyed by the SHA-256 of their contents.
//! Storing the same bytes twice returns the same [`ContentHash`] and does not
//! consume additional space.
//!
//! # Features
//!
//! - **Content-addressable storage**: identical content, identical key
//! - **Pluggable backends**: filesystem for deployments, memory for tests
//! - **Atomic commits**: a blob is never addressable until fully written
//!
//! # Example
//!
//! ```rust
//! use atelier_storage::{BlobStore, FileSystemBlobStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemBlobStore::new("/tmp/atelier-blobs")?;
//!
//! let hash = store.put(b"\x89PNG...").await?;
//! let bytes = store.get(&hash).await?;
//! assert_eq!(bytes, b"\x89PNG...");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use atelier_core::ContentHash;
use atelier_error::AtelierResult;

mod atomic;
mod filesystem;
mod memory;

pub use atelier_error::{StorageError, StorageErrorKind};
pub use atomic::{TEMP_EXTENSION, is_temp_file, write_atomically};
pub use filesystem::FileSystemBlobStore;
pub use memory::MemoryBlobStore;

/// Trait for pluggable blob storage backends.
///
/// Implementations must be safe to call concurrently; concurrent `put`s of the
/// same bytes are allowed and converge on a single stored blob.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `data` and return its content hash.
    ///
    /// Idempotent: identical bytes yield the same hash without storing a
    /// second copy. The blob is durable before this returns.
    ///
    /// # Errors
    ///
    /// Returns a storage write error on I/O failure; nothing is left
    /// addressable under the hash in that case.
    async fn put(&self, data: &[u8]) -> AtelierResult<ContentHash>;

    /// Fetch the bytes stored under `hash`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown hash and a storage read error
    /// if the stored bytes fail verification.
    async fn get(&self, hash: &ContentHash) -> AtelierResult<Vec<u8>>;

    /// Check whether a blob is stored under `hash`.
    async fn exists(&self, hash: &ContentHash) -> AtelierResult<bool>;

    /// Count stored blobs and their total size.
    async fn usage(&self) -> AtelierResult<BlobUsage>;

    /// Short backend name for logs (e.g. "filesystem").
    fn backend(&self) -> &'static str;
}

/// Blob count and total bytes held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlobUsage {
    /// Number of distinct blobs
    pub blobs: u64,
    /// Sum of blob sizes in bytes
    pub bytes: u64,
}
