//! Tests for the in-memory blob backend.

use atelier_core::ContentHash;
use atelier_storage::{BlobStore, BlobUsage, MemoryBlobStore};

#[tokio::test]
async fn test_put_get_and_dedup() {
    let store = MemoryBlobStore::new();

    let a = store.put(b"alpha").await.unwrap();
    let again = store.put(b"alpha").await.unwrap();
    let b = store.put(b"beta!").await.unwrap();

    assert_eq!(a, again);
    assert_ne!(a, b);
    assert_eq!(store.get(&a).await.unwrap(), b"alpha");
    assert_eq!(
        store.usage().await.unwrap(),
        BlobUsage {
            blobs: 2,
            bytes: 10
        }
    );
}

#[tokio::test]
async fn test_missing_blob() {
    let store = MemoryBlobStore::new();
    let missing = ContentHash::of(b"nothing");

    assert!(!store.exists(&missing).await.unwrap());
    assert!(store.get(&missing).await.unwrap_err().is_not_found());
}
