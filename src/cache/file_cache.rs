//! Content-addressed file cache over a pluggable [`Filesystem`].

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tracing::{debug, trace};

use crate::io::{is_not_found, FileReader, Filesystem};

use super::locks::LockRegistry;
use super::path::PathMapper;

// =============================================================================
// DiskCache Trait
// =============================================================================

/// Key-value cache persisted on some storage medium.
///
/// A miss is not an error: [`load`](DiskCache::load) returns `Ok(None)`.
/// Storage failures are returned as the backend's own [`io::Error`].
#[async_trait]
pub trait DiskCache: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn store(&self, key: &str, value: &[u8]) -> io::Result<()>;

    /// Load the value stored under `key`, or `None` if there is none.
    async fn load(&self, key: &str) -> io::Result<Option<Bytes>>;

    /// Remove the value stored under `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> io::Result<()>;
}

// =============================================================================
// FileCache
// =============================================================================

/// Disk cache storing each value as one file at a hash-derived path.
///
/// # Locking
///
/// `store` and `delete` on the same key are mutually exclusive; different
/// keys proceed in parallel. `load` takes no lock, so it may observe a file
/// that a concurrent `store` or `delete` on the same key is still working on.
///
/// Writes are not atomic: a failure part-way through can leave a truncated
/// file behind. The last completed `store` wins.
///
/// # Example
///
/// ```
/// use imgcache::cache::{DiskCache, FileCache};
/// use imgcache::io::MemoryFs;
///
/// #[tokio::main]
/// async fn main() -> std::io::Result<()> {
///     let cache = FileCache::new(MemoryFs::new(), "/cache");
///
///     cache.store("thumb:42", b"jpeg bytes").await?;
///     assert_eq!(cache.load("thumb:42").await?.as_deref(), Some(&b"jpeg bytes"[..]));
///
///     cache.delete("thumb:42").await?;
///     assert!(cache.load("thumb:42").await?.is_none());
///     Ok(())
/// }
/// ```
pub struct FileCache<F: Filesystem> {
    fs: F,
    paths: PathMapper,
    locks: LockRegistry,
}

impl<F: Filesystem> FileCache<F> {
    /// Create a cache storing files under `root` on `fs`.
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            paths: PathMapper::new(root),
            locks: LockRegistry::new(),
        }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Location the value for `key` is stored at.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.paths.locate(key)
    }

    /// Get a reference to the backing filesystem.
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Get a reference to the per-key lock table.
    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    /// Open the file for `key`, mapping "not found" to `None`.
    async fn open(&self, path: &Path) -> io::Result<Option<FileReader>> {
        match self.fs.open(path).await {
            Ok(reader) => Ok(Some(reader)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<F: Filesystem> DiskCache for FileCache<F> {
    async fn store(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let _guard = self.locks.acquire(key).await;

        let path = self.paths.locate(key);
        if let Some(parent) = path.parent() {
            self.fs.create_dir_all(parent).await?;
        }
        self.fs.write(&path, value).await?;

        debug!(
            backend = self.fs.identifier(),
            path = %path.display(),
            bytes = value.len(),
            "stored cache entry"
        );
        Ok(())
    }

    async fn load(&self, key: &str) -> io::Result<Option<Bytes>> {
        let path = self.paths.locate(key);

        let Some(mut reader) = self.open(&path).await? else {
            trace!(path = %path.display(), "cache miss");
            return Ok(None);
        };

        let mut value = Vec::new();
        reader.read_to_end(&mut value).await?;

        trace!(path = %path.display(), bytes = value.len(), "cache hit");
        Ok(Some(Bytes::from(value)))
    }

    async fn delete(&self, key: &str) -> io::Result<()> {
        let _guard = self.locks.acquire(key).await;

        let path = self.paths.locate(key);
        match self.fs.remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "deleted cache entry");
                Ok(())
            }
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
