//! # imgcache
//!
//! A content-addressed disk cache and a bounded-concurrency image resize service.
//!
//! The two halves are independent: the cache stores opaque byte payloads
//! under arbitrary string keys, and the resize service turns an image stream
//! into a resized, re-encoded image stream.
//!
//! ## Features
//!
//! - **Sharded on-disk layout**: Keys map to `<root>/<h0>/<h1h2>/<h>` via SHA-1
//! - **Per-key serialization**: Stores and deletes of one key never interleave
//! - **Pluggable storage**: Any [`io::Filesystem`] (local disk, in-memory, ...)
//! - **Non-consuming format detection**: The header is probed and replayed
//! - **Bounded resizing**: At most N pipelines run at once, cancellable while waiting
//!
//! ## Architecture
//!
//! - [`io`] - Filesystem capability and its local/in-memory drivers
//! - [`cache`] - Path mapping, per-key locks and the file cache
//! - [`mod@format`] - Supported formats and stream format detection
//! - [`resize`] - Resize options, geometry, codec and the resize service
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use imgcache::{DiskCache, FileCache, MemoryFs};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let cache = FileCache::new(MemoryFs::new(), "/cache");
//!
//!     cache.store("thumb:42", b"payload").await?;
//!     assert_eq!(cache.load("thumb:42").await?.as_deref(), Some(&b"payload"[..]));
//!
//!     cache.delete("thumb:42").await?;
//!     assert!(cache.load("thumb:42").await?.is_none());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod resize;

// Re-export commonly used types
pub use cache::{DiskCache, FileCache, KeyGuard, LockRegistry, PathMapper};
pub use config::{CacheAction, CacheConfig, Cli, Command, DetectConfig, ResizeConfig};
pub use error::ImageError;
pub use format::{
    detect_format, format_from_extension, Format, ProbeReader, ReplayReader, MAX_HEADER_BYTES,
    MAX_PROBE_BYTES,
};
pub use io::{is_not_found, Filesystem, LocalFs, MemoryFs};
pub use resize::{
    fill_dimensions, fit_dimensions, ConcurrencyGate, GateSlot, Quality, ResampleFilter,
    ResizeMode, ResizeOptions, ResizeOutcome, ResizeService, Transcoder,
};
