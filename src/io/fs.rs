use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncRead;

/// A readable handle returned by [`Filesystem::open`].
pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;

/// Trait for the storage medium underneath the disk cache.
///
/// This abstraction lets the cache run over local disk, memory, or a
/// network-backed store without knowing which. Implementations must be
/// thread-safe.
///
/// Errors are plain [`io::Error`] values. A missing file or directory must be
/// reported with [`io::ErrorKind::NotFound`] so callers can tell absence apart
/// from real failures.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Open the file at `path` for reading.
    async fn open(&self, path: &Path) -> io::Result<FileReader>;

    /// Create or truncate the file at `path` and write all of `data` to it.
    ///
    /// The parent directory must already exist.
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Remove the file at `path`.
    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create `path` and every missing ancestor directory.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Get a short name for this backend (for logging).
    fn identifier(&self) -> &str;
}

/// Whether an error means "the path does not exist".
#[inline]
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}
