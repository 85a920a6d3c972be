//! Durable per-asset records.
//!
//! Each asset is one JSON document at `{dir}/{asset_id}.json` holding the
//! asset and its full version history. Documents are replaced atomically, so
//! a reader (or a restart) sees either the previous record or the new one.

use atelier_core::{Asset, AssetId, Version};
use atelier_error::{AtelierResult, StorageError, StorageErrorKind};
use atelier_storage::{is_temp_file, write_atomically};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// An asset together with its complete version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Current view
    pub asset: Asset,
    /// Versions in number order, starting at 1
    pub versions: Vec<Version>,
}

impl AssetRecord {
    /// Number the next appended version receives.
    pub fn next_number(&self) -> u32 {
        self.versions.len() as u32 + 1
    }

    /// Check the version history invariants.
    ///
    /// Versions must be numbered 1..=N without gaps, belong to this asset,
    /// carry strictly increasing timestamps, and the last one must be the
    /// asset's current version.
    pub fn check(&self) -> Result<(), String> {
        let id = self.asset.id;
        for (index, version) in self.versions.iter().enumerate() {
            let expected = index as u32 + 1;
            if version.number != expected {
                return Err(format!(
                    "asset {} has version {} where {} was expected",
                    id, version.number, expected
                ));
            }
            if version.asset_id != id {
                return Err(format!(
                    "version {} of asset {} belongs to {}",
                    version.number, id, version.asset_id
                ));
            }
        }
        if self
            .versions
            .windows(2)
            .any(|pair| pair[0].created_at >= pair[1].created_at)
        {
            return Err(format!("asset {} has out-of-order version timestamps", id));
        }
        match self.versions.last() {
            Some(last) if *last == self.asset.current => Ok(()),
            Some(_) => Err(format!(
                "asset {} current version is not its latest version",
                id
            )),
            None => Err(format!("asset {} has no versions", id)),
        }
    }
}

/// Directory of asset records.
#[derive(Debug, Clone)]
pub struct RecordDir {
    path: PathBuf,
}

impl RecordDir {
    /// Open (creating if needed) a record directory.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> AtelierResult<Self> {
        let path = path.into();
        tokio::fs::create_dir_all(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(Self { path })
    }

    /// Directory holding the records.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_for(&self, id: AssetId) -> PathBuf {
        self.path.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    /// Durably replace the record for `record.asset.id`.
    ///
    /// # Errors
    ///
    /// Returns a storage write error if serialization or the write fails. The
    /// previous record, if any, is left intact.
    pub async fn save(&self, record: &AssetRecord) -> AtelierResult<()> {
        let data = serde_json::to_vec_pretty(record).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(e.to_string()))
        })?;
        write_atomically(&self.path_for(record.asset.id), &data).await
    }

    /// Load every record in the directory.
    ///
    /// Leftover temp files from interrupted writes are removed.
    ///
    /// # Errors
    ///
    /// Returns a storage read error if the directory cannot be listed or a
    /// record cannot be read, parsed, or fails its invariants.
    pub async fn load_all(&self) -> AtelierResult<Vec<AssetRecord>> {
        let read_err = |path: &Path, e: &dyn std::fmt::Display| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        };

        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.path)
            .await
            .map_err(|e| read_err(&self.path, &e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| read_err(&self.path, &e))?
        {
            let path = entry.path();
            if is_temp_file(&path) {
                if tokio::fs::remove_file(&path).await.is_ok() {
                    tracing::warn!(path = %path.display(), "Removed interrupted record write");
                }
                continue;
            }
            if path.extension().is_none_or(|ext| ext != RECORD_EXTENSION) {
                continue;
            }

            let data = tokio::fs::read(&path)
                .await
                .map_err(|e| read_err(&path, &e))?;
            let record: AssetRecord = serde_json::from_slice(&data).map_err(|e| {
                StorageError::new(StorageErrorKind::Corrupted(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            })?;
            record.check().map_err(|reason| {
                StorageError::new(StorageErrorKind::Corrupted(format!(
                    "{}: {}",
                    path.display(),
                    reason
                )))
            })?;
            records.push(record);
        }

        tracing::debug!(path = %self.path.display(), count = records.len(), "Loaded asset records");
        Ok(records)
    }
}
