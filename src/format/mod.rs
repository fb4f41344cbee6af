//! Image container formats and header sniffing.
//!
//! # Format Detection
//!
//! Use [`detect::detect_format`] to classify an input stream. The first
//! [`MAX_PROBE_BYTES`] are matched against known signatures and the header
//! is parsed, reading further only when the header needs it. The returned
//! [`ReplayReader`] yields the complete stream for decoding. Supported formats:
//!
//! - **JPEG**, **PNG**, **GIF**, **TIFF**, **BMP**
//!
//! Anything else maps to `ImageError::UnsupportedFormat`.

pub mod detect;
mod kind;

pub use detect::{
    classify_header, detect_format, ProbeReader, ReplayReader, MAX_HEADER_BYTES, MAX_PROBE_BYTES,
};
pub use kind::{format_from_extension, Format};
