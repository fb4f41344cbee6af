use thiserror::Error;

/// Errors produced by format detection and the resize pipeline.
///
/// Cache operations do not use this type: storage failures are surfaced as
/// the backing filesystem's own [`std::io::Error`].
#[derive(Debug, Error)]
pub enum ImageError {
    /// The stream or extension does not name one of the supported formats
    #[error("Unsupported image format: {reason}")]
    UnsupportedFormat { reason: String },

    /// A resize option given as text did not name a known value
    #[error("Invalid {kind}: {value:?}")]
    InvalidOption { kind: &'static str, value: String },

    /// Target dimensions must both be non-zero
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The caller cancelled while waiting for a concurrency slot
    #[error("Resize cancelled before a worker slot was acquired")]
    Cancelled,

    /// The source image could not be decoded
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// The transformed image could not be encoded
    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    /// Reading the input or writing the output stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking worker running the pipeline did not complete
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ImageError {
    /// Shorthand for an [`ImageError::UnsupportedFormat`] with a reason.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        ImageError::UnsupportedFormat {
            reason: reason.into(),
        }
    }

    /// Whether this error means the input or requested format is not handled.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, ImageError::UnsupportedFormat { .. })
    }
}
