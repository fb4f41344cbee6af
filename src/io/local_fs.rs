//! Local disk implementation of [`Filesystem`].

use std::io;
use std::path::Path;

use async_trait::async_trait;

use super::{FileReader, Filesystem};

/// Permission bits for directories created by the cache (owner only).
pub const DEFAULT_DIR_MODE: u32 = 0o700;

/// [`Filesystem`] backed by the local disk through `tokio::fs`.
///
/// Paths are used exactly as given; the cache is responsible for joining
/// them onto its root directory.
#[derive(Debug, Clone)]
pub struct LocalFs {
    dir_mode: u32,
}

impl LocalFs {
    /// Create a local filesystem that creates directories with mode 0700.
    pub fn new() -> Self {
        Self::with_dir_mode(DEFAULT_DIR_MODE)
    }

    /// Create a local filesystem with custom directory permission bits.
    ///
    /// The mode is ignored on platforms without unix permissions.
    pub fn with_dir_mode(dir_mode: u32) -> Self {
        Self { dir_mode }
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Filesystem for LocalFs {
    async fn open(&self, path: &Path) -> io::Result<FileReader> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::new(file))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, data).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(self.dir_mode);
        builder.create(path).await
    }

    fn identifier(&self) -> &str {
        "local"
    }
}
