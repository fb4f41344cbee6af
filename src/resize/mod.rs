//! Image resize layer.
//!
//! Takes an image stream, detects its format, scales it with one of two
//! geometric policies and re-encodes it, with a fixed number of pipelines
//! allowed to run at once.
//!
//! # Components
//!
//! - [`ResizeService`]: Main entry point, orchestrates the full pipeline
//! - [`ConcurrencyGate`]: Bounds concurrent pipelines; slots release on drop
//! - [`ResizeOptions`]: Output format, [`ResizeMode`] and [`Quality`] with defaults
//! - [`Transcoder`]: Decodes with orientation correction, encodes to a [`Format`](crate::format::Format)
//! - [`fit_dimensions`] / [`fill_dimensions`]: Output geometry
//!
//! # Example
//!
//! ```
//! use imgcache::resize::{fill_dimensions, fit_dimensions};
//!
//! assert_eq!(fit_dimensions((200, 100), (100, 100)), (100, 50));
//! assert_eq!(fill_dimensions((200, 100), (100, 100)), (200, 100));
//! ```

mod codec;
mod gate;
mod options;
mod service;
mod transform;

pub use codec::Transcoder;
pub use gate::{ConcurrencyGate, GateSlot};
pub use options::{Quality, ResampleFilter, ResizeMode, ResizeOptions, ResolvedOptions};
pub use service::{ResizeOutcome, ResizeService, DEFAULT_WORKERS};
pub use transform::{apply, fill, fill_dimensions, fit, fit_dimensions, resample};
