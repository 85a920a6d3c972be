//! Filesystem-based blob storage implementation.
//!
//! Blobs are stored in a content-addressable tree sharded by hash prefix, so
//! identical content always lands on the same path.

use crate::{BlobStore, BlobUsage, is_temp_file, write_atomically};
use atelier_core::ContentHash;
use atelier_error::{
    AtelierError, AtelierResult, NotFoundError, NotFoundErrorKind, StorageError, StorageErrorKind,
};
use std::path::{Path, PathBuf};

/// Filesystem blob backend.
///
/// Stores blobs in a content-addressable structure:
/// `{base_path}/{hash[0:2]}/{hash[2:4]}/{hash}`
///
/// # Example Structure
///
/// ```text
/// /var/atelier/blobs/
/// ├── ab/
/// │   └── cd/
/// │       └── abcdef123456...
/// └── 12/
///     └── 34/
///         └── 123456abcdef...
/// ```
///
/// Writes are committed with [`write_atomically`], so a blob is addressable
/// only once it is complete and durable.
#[derive(Debug, Clone)]
pub struct FileSystemBlobStore {
    base_path: PathBuf,
}

impl FileSystemBlobStore {
    /// Create a new filesystem blob store.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> AtelierResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        let removed = sweep_temp_files(&base_path)?;
        if removed > 0 {
            tracing::warn!(removed, "Removed interrupted blob writes");
        }

        tracing::info!(path = %base_path.display(), "Opened filesystem blob store");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    async fn is_stored(&self, path: &Path) -> AtelierResult<bool> {
        tokio::fs::try_exists(path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", path.display(), e)))
                .into()
        })
    }

    /// Filesystem path for a given hash.
    ///
    /// Structure: `{base}/{hash[0:2]}/{hash[2:4]}/{hash}`
    pub fn path_for(&self, hash: &ContentHash) -> PathBuf {
        let (outer, inner) = hash.shards();
        self.base_path.join(outer).join(inner).join(hash.as_str())
    }
}

/// Delete temp files left by writes that never committed.
///
/// Returns how many were removed.
fn sweep_temp_files(base_path: &Path) -> AtelierResult<usize> {
    let read_err = |dir: &Path, e: std::io::Error| {
        StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
    };
    let mut removed = 0;
    let mut pending = vec![base_path.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir).map_err(|e| read_err(&dir, e))? {
            let entry = entry.map_err(|e| read_err(&dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| read_err(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if is_temp_file(&path) {
                match std::fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Could not remove temp file")
                    }
                }
            }
        }
    }

    Ok(removed)
}

#[async_trait::async_trait]
impl BlobStore for FileSystemBlobStore {
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, data: &[u8]) -> AtelierResult<ContentHash> {
        let hash = ContentHash::of(data);
        let path = self.path_for(&hash);

        // If file already exists, just return its hash (deduplication)
        if self.is_stored(&path).await? {
            tracing::debug!(hash = %hash, "Blob already stored");
            return Ok(hash);
        }

        write_atomically(&path, data).await?;

        tracing::info!(
            hash = %hash,
            path = %path.display(),
            size = data.len(),
            "Stored blob"
        );
        Ok(hash)
    }

    #[tracing::instrument(skip(self), fields(hash = %hash))]
    async fn get(&self, hash: &ContentHash) -> AtelierResult<Vec<u8>> {
        let path = self.path_for(hash);

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NotFoundError::new(NotFoundErrorKind::Blob(hash.to_string())).into()
            } else {
                AtelierError::from(StorageError::new(StorageErrorKind::FileRead(
                    format!("{}: {}", path.display(), e),
                )))
            }
        })?;

        if !hash.matches(&data) {
            return Err(StorageError::new(StorageErrorKind::Corrupted(format!(
                "{} no longer matches its hash",
                path.display()
            )))
            .into());
        }

        tracing::debug!(hash = %hash, size = data.len(), "Retrieved blob");
        Ok(data)
    }

    async fn exists(&self, hash: &ContentHash) -> AtelierResult<bool> {
        self.is_stored(&self.path_for(hash)).await
    }

    async fn usage(&self) -> AtelierResult<BlobUsage> {
        let mut usage = BlobUsage::default();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
            })?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
            })? {
                let meta = entry.metadata().await.map_err(|e| {
                    StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        entry.path().display(),
                        e
                    )))
                })?;
                if meta.is_dir() {
                    pending.push(entry.path());
                } else if ContentHash::parse(&entry.file_name().to_string_lossy()).is_ok() {
                    usage.blobs += 1;
                    usage.bytes += meta.len();
                }
            }
        }

        Ok(usage)
    }

    fn backend(&self) -> &'static str {
        "filesystem"
    }
}
