//! In-memory implementation of [`Filesystem`].
//!
//! Useful for tests and for caches that should not outlive the process.
//! The tree follows POSIX-like rules: a file can only be written into a
//! directory that exists, and missing paths report `NotFound`.

use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{FileReader, Filesystem};

#[derive(Debug, Default)]
struct Tree {
    dirs: HashSet<PathBuf>,
    files: HashMap<PathBuf, Bytes>,
}

impl Tree {
    fn dir_exists(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || path.parent().is_none() || self.dirs.contains(path)
    }
}

/// [`Filesystem`] held entirely in memory.
///
/// Cloning yields another handle to the same tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    tree: Arc<RwLock<Tree>>,
}

impl MemoryFs {
    /// Create an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently stored.
    pub fn file_count(&self) -> usize {
        self.tree.read().files.len()
    }

    /// Whether a file exists at `path`.
    pub fn contains_file(&self, path: &Path) -> bool {
        self.tree.read().files.contains_key(path)
    }

    /// Whether a directory exists at `path`.
    pub fn contains_dir(&self, path: &Path) -> bool {
        self.tree.read().dir_exists(path)
    }

    /// Get a copy of a file's content without going through `open`.
    pub fn read_file(&self, path: &Path) -> Option<Bytes> {
        self.tree.read().files.get(path).cloned()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

#[async_trait]
impl Filesystem for MemoryFs {
    async fn open(&self, path: &Path) -> io::Result<FileReader> {
        let data = self
            .tree
            .read()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(data)))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut tree = self.tree.write();

        if tree.dirs.contains(path) {
            return Err(io::Error::other(format!(
                "{}: is a directory",
                path.display()
            )));
        }
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        if !tree.dir_exists(parent) {
            return Err(not_found(parent));
        }

        tree.files
            .insert(path.to_path_buf(), Bytes::copy_from_slice(data));
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.tree
            .write()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut tree = self.tree.write();

        // Validate the whole chain first so a failure leaves the tree untouched
        if let Some(file) = path.ancestors().find(|p| tree.files.contains_key(*p)) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{}: is a file", file.display()),
            ));
        }

        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() || ancestor.parent().is_none() {
                break;
            }
            if !tree.dirs.insert(ancestor.to_path_buf()) {
                // Everything above an existing directory exists too
                break;
            }
        }
        Ok(())
    }

    fn identifier(&self) -> &str {
        "memory"
    }
}
