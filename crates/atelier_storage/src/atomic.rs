//! Temp-file + fsync + rename commits.

use atelier_error::{AtelierResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Extension carried by in-progress writes.
pub const TEMP_EXTENSION: &str = "tmp";

/// Write `data` to `path` so that readers see either the old file or the
/// complete new one, never a partial write.
///
/// The bytes go to a uniquely named temp file beside `path`, are fsynced, and
/// the temp file is renamed over `path`. If the write fails, or the returned
/// future is dropped before completion, the temp file is removed.
///
/// # Errors
///
/// Returns a storage write error if the directory cannot be created or any
/// step of the write fails.
pub async fn write_atomically(path: &Path, data: &[u8]) -> AtelierResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(parent).await.map_err(|e| {
        StorageError::new(StorageErrorKind::DirectoryCreation(format!(
            "{}: {}",
            parent.display(),
            e
        )))
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = TempFile::new(parent.join(format!(
        "{}.{}.{}",
        file_name,
        Uuid::new_v4().simple(),
        TEMP_EXTENSION
    )));

    let write_err = |e: std::io::Error| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            temp.path.display(),
            e
        )))
    };

    let mut file = tokio::fs::File::create(&temp.path).await.map_err(write_err)?;
    file.write_all(data).await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    drop(file);

    tokio::fs::rename(&temp.path, path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "rename {} to {}: {}",
            temp.path.display(),
            path.display(),
            e
        )))
    })?;
    temp.commit();

    // Persist the directory entry; not every platform allows fsync on a directory.
    match tokio::fs::File::open(parent).await {
        Ok(dir) => {
            if let Err(e) = dir.sync_all().await {
                tracing::debug!(dir = %parent.display(), error = %e, "Directory sync unsupported");
            }
        }
        Err(e) => {
            tracing::debug!(dir = %parent.display(), error = %e, "Could not open directory for sync");
        }
    }

    Ok(())
}

/// Whether `path` names an in-progress (or abandoned) atomic write.
pub fn is_temp_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TEMP_EXTENSION)
}

/// Temp file that removes itself unless committed.
struct TempFile {
    path: PathBuf,
    committed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.committed && std::fs::remove_file(&self.path).is_ok() {
            tracing::warn!(path = %self.path.display(), "Removed abandoned temp file");
        }
    }
}
