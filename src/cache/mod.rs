//! Content-addressed disk cache.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               FileCache                 │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  PathMapper  │  │  LockRegistry   │  │
//! │  │  (SHA-1 →    │  │  (one mutex per │  │
//! │  │   shard path)│  │   live key)     │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         Filesystem (io module)          │
//! │      LocalFs  /  MemoryFs  /  ...       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`DiskCache`]: The store/load/delete contract
//! - [`FileCache`]: One file per key under a sharded directory tree
//! - [`PathMapper`]: Key → `<root>/<h0>/<h1h2>/<h>` where `h` is the SHA-1 hex digest
//! - [`LockRegistry`]: Serializes mutations of the same key

mod file_cache;
mod locks;
mod path;

pub use file_cache::{DiskCache, FileCache};
pub use locks::{KeyGuard, LockRegistry};
pub use path::{PathMapper, DIGEST_HEX_LEN};
