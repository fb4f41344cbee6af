//! Resize Service orchestrating the transcode pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ResizeService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                      resize()                           │    │
//! │  │  1. Acquire gate slot   4. Decode + orient              │    │
//! │  │  2. Detect format       5. Fit / Fill                   │    │
//! │  │  3. Resolve options     6. Encode & write               │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │           │
//! │           ▼                    ▼                    ▼           │
//! │  ┌─────────────────┐   ┌──────────────┐    ┌──────────────┐     │
//! │  │ ConcurrencyGate │   │ ProbeReader  │    │  Transcoder  │     │
//! │  └─────────────────┘   └──────────────┘    └──────────────┘     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate slot is taken before anything else and held until the output has
//! been flushed. Pixel work runs on the blocking thread pool.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ImageError;
use crate::format::{self, detect_format, Format};

use super::codec::Transcoder;
use super::gate::ConcurrencyGate;
use super::options::{ResizeOptions, ResolvedOptions};
use super::transform;

/// Default number of concurrent resize pipelines.
pub const DEFAULT_WORKERS: usize = 4;

// =============================================================================
// Resize Outcome
// =============================================================================

/// Result of a successful resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    /// Format the output was encoded as
    pub format: Format,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Number of encoded bytes written to the output stream
    pub bytes_written: u64,
}

// =============================================================================
// Resize Service
// =============================================================================

/// Service for resizing and transcoding images with bounded concurrency.
///
/// # Example
///
/// ```no_run
/// use imgcache::resize::{ResizeMode, ResizeOptions, ResizeService};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), imgcache::ImageError> {
/// let service = ResizeService::new(4);
/// let input = tokio::fs::File::open("photo.jpg").await?;
/// let mut output = tokio::fs::File::create("thumb.jpg").await?;
///
/// let outcome = service
///     .resize(
///         input,
///         200,
///         200,
///         &mut output,
///         ResizeOptions::new().with_mode(ResizeMode::Fill),
///         &CancellationToken::new(),
///     )
///     .await?;
///
/// println!("{}x{} {}", outcome.width, outcome.height, outcome.format);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResizeService {
    gate: ConcurrencyGate,
    transcoder: Transcoder,
}

impl ResizeService {
    /// Create a service running at most `workers` pipelines at once.
    pub fn new(workers: usize) -> Self {
        Self {
            gate: ConcurrencyGate::new(workers),
            transcoder: Transcoder::new(),
        }
    }

    /// The gate bounding this service's concurrency.
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Map a file extension to a [`Format`].
    pub fn format_from_extension(&self, ext: &str) -> Result<Format, ImageError> {
        format::format_from_extension(ext)
    }

    /// Resize `input` to `width` x `height` and write the encoded result to `output`.
    ///
    /// Waits for a gate slot first. If `cancel` fires while waiting, returns
    /// [`ImageError::Cancelled`] without reading `input` or writing `output`.
    ///
    /// # Errors
    ///
    /// - [`ImageError::Cancelled`] if cancelled before a slot was free
    /// - [`ImageError::InvalidDimensions`] if either dimension is zero
    /// - [`ImageError::UnsupportedFormat`] if the input is not a supported image
    /// - [`ImageError::Decode`] / [`ImageError::Encode`] from the codec
    /// - [`ImageError::Io`] if reading or writing a stream fails
    pub async fn resize<R, W>(
        &self,
        input: R,
        width: u32,
        height: u32,
        output: &mut W,
        options: ResizeOptions,
        cancel: &CancellationToken,
    ) -> Result<ResizeOutcome, ImageError>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let _slot = self.gate.acquire(cancel).await?;

        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }

        let (detected, mut reader) = detect_format(input).await?;
        let resolved = options.resolve(detected);

        let mut source = Vec::new();
        reader.read_to_end(&mut source).await?;

        debug!(
            detected = %detected,
            output_format = %resolved.format,
            mode = %resolved.mode,
            quality = %resolved.quality,
            source_bytes = source.len(),
            "Resizing to {}x{}",
            width,
            height
        );

        let transcoder = self.transcoder.clone();
        let (encoded, out_width, out_height) = tokio::task::spawn_blocking(move || {
            render(&transcoder, &source, detected, width, height, resolved)
        })
        .await
        .map_err(|e| ImageError::Internal {
            message: format!("resize worker failed: {}", e),
        })??;

        output.write_all(&encoded).await?;
        output.flush().await?;

        debug!(
            width = out_width,
            height = out_height,
            bytes = encoded.len(),
            "Resize complete"
        );

        Ok(ResizeOutcome {
            format: resolved.format,
            width: out_width,
            height: out_height,
            bytes_written: encoded.len() as u64,
        })
    }

    /// Resize the file at `input` and store the result at `output`.
    ///
    /// The encoded image is buffered in memory and moved into place through
    /// a temporary file next to `output`, so `output` is only replaced once
    /// the resize has succeeded. `input` and `output` may name the same file.
    ///
    /// # Errors
    ///
    /// Everything [`resize`](Self::resize) returns, plus [`ImageError::Io`]
    /// if `input` cannot be opened or `output` cannot be written.
    pub async fn resize_file(
        &self,
        input: &Path,
        output: &Path,
        width: u32,
        height: u32,
        options: ResizeOptions,
        cancel: &CancellationToken,
    ) -> Result<ResizeOutcome, ImageError> {
        let source = tokio::fs::File::open(input).await?;

        let mut encoded = Vec::new();
        let outcome = self
            .resize(source, width, height, &mut encoded, options, cancel)
            .await?;

        replace_file(output, &encoded).await?;
        Ok(outcome)
    }
}

/// Write `data` to a sibling temporary file, then rename it over `path`.
async fn replace_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let staging = staging_path(path)?;

    if let Err(e) = tokio::fs::write(&staging, data).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }

    debug!(path = %path.display(), bytes = data.len(), "Output written");
    Ok(())
}

fn staging_path(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        )
    })?;

    let mut staged = std::ffi::OsString::from(".");
    staged.push(name);
    staged.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(staged))
}

impl Default for ResizeService {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

/// Decode, transform and encode. Runs on a blocking thread.
fn render(
    transcoder: &Transcoder,
    source: &[u8],
    detected: Format,
    width: u32,
    height: u32,
    options: ResolvedOptions,
) -> Result<(bytes::Bytes, u32, u32), ImageError> {
    let img = transcoder.decode(source, detected)?;
    let resized = transform::apply(
        &img,
        width,
        height,
        options.mode,
        options.quality.resample_filter(),
    );
    let (w, h) = (resized.width(), resized.height());
    let encoded = transcoder.encode(resized, options.format)?;
    Ok((encoded, w, h))
}

// =============================================================================
// Tests
// =============================================================================
