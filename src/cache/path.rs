//! Content-addressed path mapping.
//!
//! Every key is hashed with SHA-1 and stored two shard levels deep:
//!
//! ```text
//! <root>/<h[0]>/<h[1..3]>/<h>
//! ```
//!
//! giving 16 first-level and 256 second-level buckets per first-level
//! directory. The mapping depends only on the key bytes, so it is stable
//! across processes and runs.

use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_HEX_LEN: usize = 40;

/// Maps opaque cache keys to sharded file locations under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    root: PathBuf,
}

impl PathMapper {
    /// Create a mapper rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lowercase hex SHA-1 digest of `key`.
    pub fn digest(key: &str) -> String {
        hex::encode(Sha1::digest(key.as_bytes()))
    }

    /// Sharded location of `key`, relative to the root.
    pub fn relative(key: &str) -> PathBuf {
        let digest = Self::digest(key);
        let mut path = PathBuf::from(&digest[..1]);
        path.push(&digest[1..3]);
        path.push(&digest);
        path
    }

    /// Full location of `key` under the root.
    pub fn locate(&self, key: &str) -> PathBuf {
        self.root.join(Self::relative(key))
    }
}
