//! Disk cache integration tests.
//!
//! Tests verify:
//! - Concurrent stores of one key never interleave
//! - Stores of distinct keys run in parallel
//! - On-disk layout under a real directory
//! - Filesystem errors surface unchanged, "not found" is normalized
//! - Loads are not blocked by a held key lock

use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tempfile::TempDir;

use imgcache::cache::{DiskCache, FileCache, PathMapper, DIGEST_HEX_LEN};
use imgcache::io::LocalFs;

use super::test_utils::{FailingFs, OverlapTrackingFs};

// =============================================================================
// Per-key Serialization
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_key_stores_are_serialized() {
    let cache = Arc::new(FileCache::new(
        OverlapTrackingFs::new(Duration::from_millis(10)),
        "/cache",
    ));

    let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 256]).collect();

    let handles: Vec<_> = payloads
        .iter()
        .cloned()
        .map(|payload| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.store("shared", &payload).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(cache.filesystem().max_active(), 1);

    let stored = cache.load("shared").await.unwrap().unwrap();
    assert!(payloads.iter().any(|p| p.as_slice() == stored.as_ref()));
    assert!(cache.locks().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_keys_store_in_parallel() {
    let cache = Arc::new(FileCache::new(
        OverlapTrackingFs::new(Duration::from_millis(100)),
        "/cache",
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.store(&format!("key-{}", i), b"v").await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(cache.filesystem().max_active() >= 2);
    assert_eq!(cache.filesystem().inner().file_count(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stores_on_disk_never_mix() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileCache::new(LocalFs::new(), dir.path()));

    let a = Arc::new(vec![0xAAu8; 1 << 20]);
    let b = Arc::new(vec![0xBBu8; 1 << 20]);

    for _ in 0..10 {
        let first = {
            let (cache, a) = (Arc::clone(&cache), Arc::clone(&a));
            tokio::spawn(async move { cache.store("contended", &a).await })
        };
        let second = {
            let (cache, b) = (Arc::clone(&cache), Arc::clone(&b));
            tokio::spawn(async move { cache.store("contended", &b).await })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let stored = cache.load("contended").await.unwrap().unwrap();
        assert!(
            stored.as_ref() == a.as_slice() || stored.as_ref() == b.as_slice(),
            "stored content is a mixture"
        );
    }
}

// =============================================================================
// Local Disk
// =============================================================================

#[tokio::test]
async fn test_local_round_trip_and_layout() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(LocalFs::new(), dir.path());

    cache.store("abc", b"hello").await.unwrap();

    let expected = dir
        .path()
        .join("a")
        .join("99")
        .join("a9993e364706816aba3e25717850c26c9cd0d89d");
    assert_eq!(cache.path_for("abc"), expected);
    assert_eq!(std::fs::read(&expected).unwrap(), b"hello");

    assert_eq!(
        cache.load("abc").await.unwrap(),
        Some(Bytes::from_static(b"hello"))
    );
}

#[tokio::test]
async fn test_local_miss_delete_and_idempotence() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(LocalFs::new(), dir.path());

    assert_eq!(cache.load("never-stored").await.unwrap(), None);
    cache.delete("never-stored").await.unwrap();

    cache.store("k", b"v1").await.unwrap();
    cache.delete("k").await.unwrap();
    assert_eq!(cache.load("k").await.unwrap(), None);
    assert!(!cache.path_for("k").exists());

    cache.delete("k").await.unwrap();
}

#[tokio::test]
async fn test_local_overwrite_shrinks_file() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(LocalFs::new(), dir.path());

    cache.store("k", &[7u8; 4096]).await.unwrap();
    cache.store("k", b"short").await.unwrap();

    assert_eq!(
        cache.load("k").await.unwrap(),
        Some(Bytes::from_static(b"short"))
    );
}

#[test]
fn test_mapped_paths_are_distinct_and_sharded() {
    let mapper = PathMapper::new("/root");
    let mut seen = HashSet::new();

    for i in 0..2000 {
        let key = format!("image-{}", i);
        let path = mapper.locate(&key);
        assert!(seen.insert(path.clone()), "duplicate path for {}", key);

        let rel = path.strip_prefix("/root").unwrap();
        let parts: Vec<_> = rel.iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), DIGEST_HEX_LEN);
        assert_eq!(parts[0], &parts[2][..1]);
        assert_eq!(parts[1], &parts[2][1..3]);
    }
}

// =============================================================================
// Error Propagation
// =============================================================================

#[tokio::test]
async fn test_storage_errors_surface_unchanged() {
    let cache = FileCache::new(FailingFs::new(io::ErrorKind::PermissionDenied), "/cache");

    let err = cache.store("k", b"v").await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

    let err = cache.load("k").await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

    let err = cache.delete("k").await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

    // Failed operations still release their key locks
    assert!(cache.locks().is_empty());
}

#[tokio::test]
async fn test_not_found_is_normalized() {
    let cache = FileCache::new(FailingFs::new(io::ErrorKind::NotFound), "/cache");

    assert_eq!(cache.load("k").await.unwrap(), None);
    cache.delete("k").await.unwrap();

    // Store does not normalize: a missing directory is a real failure
    let err = cache.store("k", b"v").await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

// =============================================================================
// Load Does Not Take the Key Lock
// =============================================================================

#[tokio::test]
async fn test_load_bypasses_held_key_lock() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(LocalFs::new(), dir.path());
    cache.store("k", b"v").await.unwrap();

    let _held = cache.locks().acquire("k").await;

    let loaded = tokio::time::timeout(Duration::from_millis(200), cache.load("k"))
        .await
        .expect("load must not wait for the key lock")
        .unwrap();
    assert_eq!(loaded, Some(Bytes::from_static(b"v")));

    // A store on the same key does wait
    let store = tokio::time::timeout(Duration::from_millis(50), cache.store("k", b"w")).await;
    assert!(store.is_err());
    assert!(cache.path_for("k").exists());
}
