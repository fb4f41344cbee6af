//! Storage layer underneath the disk cache.
//!
//! - [`Filesystem`]: Capability trait (open, write, remove, mkdir -p)
//! - [`LocalFs`]: Local disk via `tokio::fs`
//! - [`MemoryFs`]: In-memory tree for tests and ephemeral caches

mod fs;
mod local_fs;
mod memory_fs;

pub use fs::{is_not_found, FileReader, Filesystem};
pub use local_fs::{LocalFs, DEFAULT_DIR_MODE};
pub use memory_fs::MemoryFs;
