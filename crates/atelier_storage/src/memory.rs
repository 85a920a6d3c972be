//! In-memory blob storage.

use crate::{BlobStore, BlobUsage};
use atelier_core::ContentHash;
use atelier_error::{AtelierResult, NotFoundError, NotFoundErrorKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory blob store.
///
/// Holds blobs in a HashMap protected by an RwLock. All data is lost when the
/// store is dropped; intended for tests and ephemeral deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<ContentHash, Arc<[u8]>>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, data: &[u8]) -> AtelierResult<ContentHash> {
        let hash = ContentHash::of(data);
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(&hash) {
            tracing::debug!(hash = %hash, "Blob already stored");
        } else {
            blobs.insert(hash.clone(), Arc::from(data));
            tracing::debug!(hash = %hash, "Stored blob in memory");
        }
        Ok(hash)
    }

    async fn get(&self, hash: &ContentHash) -> AtelierResult<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(hash)
            .map(|b| b.to_vec())
            .ok_or_else(|| NotFoundError::new(NotFoundErrorKind::Blob(hash.to_string())).into())
    }

    async fn exists(&self, hash: &ContentHash) -> AtelierResult<bool> {
        Ok(self.blobs.read().await.contains_key(hash))
    }

    async fn usage(&self) -> AtelierResult<BlobUsage> {
        let blobs = self.blobs.read().await;
        Ok(BlobUsage {
            blobs: blobs.len() as u64,
            bytes: blobs.values().map(|b| b.len() as u64).sum(),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
