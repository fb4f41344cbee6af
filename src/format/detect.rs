//! Non-consuming format detection for image streams.
//!
//! The header of an input stream is read into a bounded probe buffer,
//! classified by its magic bytes and then parsed far enough to read the
//! image dimensions. The stream handed back replays the probe buffer first
//! and then continues with the unread remainder, so a later full decode sees
//! exactly the bytes the original stream would have produced.

use std::io::{self, Cursor};

use image::ImageReader;
use tokio::io::{AsyncRead, AsyncReadExt, Chain};
use tracing::debug;

use crate::error::ImageError;

use super::kind::Format;

/// Number of leading bytes buffered for classification.
pub const MAX_PROBE_BYTES: usize = 4096;

/// Upper bound the probe window may grow to while parsing a header.
///
/// TIFF writers commonly place the directory after the pixel data, so the
/// header of a TIFF can only be read once most of the file is buffered.
pub const MAX_HEADER_BYTES: usize = 16 * 1024 * 1024;

/// Stream that yields the buffered header followed by the rest of the input.
pub type ReplayReader<R> = Chain<Cursor<Vec<u8>>, R>;

// =============================================================================
// ProbeReader
// =============================================================================

/// Look-ahead buffer over a stream.
///
/// Bytes pulled in by [`probe`](ProbeReader::probe) are kept, and
/// [`into_reader`](ProbeReader::into_reader) turns the probe back into a
/// stream that starts with them.
#[derive(Debug)]
pub struct ProbeReader<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> ProbeReader<R> {
    /// Wrap `inner` with an empty probe buffer.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    /// Buffer up to `max` bytes in total from the inner stream.
    ///
    /// Returns fewer bytes only if the stream ends first. Calling it again
    /// with a larger limit extends the buffer.
    pub async fn probe(&mut self, max: usize) -> io::Result<&[u8]> {
        let wanted = max.saturating_sub(self.buffer.len());
        if wanted > 0 {
            let mut limited = (&mut self.inner).take(wanted as u64);
            limited.read_to_end(&mut self.buffer).await?;
        }
        Ok(&self.buffer)
    }

    /// All bytes captured so far.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Split into the captured bytes and the inner stream.
    pub fn into_parts(self) -> (Vec<u8>, R) {
        (self.buffer, self.inner)
    }

    /// Stream the captured bytes, then the rest of the inner stream.
    pub fn into_reader(self) -> ReplayReader<R> {
        Cursor::new(self.buffer).chain(self.inner)
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Classify a stream and validate its header without consuming it.
///
/// The first [`MAX_PROBE_BYTES`] are classified by signature. The header is
/// then parsed for the image dimensions; if it extends past the buffered
/// window the window doubles, up to [`MAX_HEADER_BYTES`].
///
/// # Returns
/// * `Ok((format, reader))` - The detected format and a reader replaying the full stream
/// * `Err(ImageError::UnsupportedFormat)` - Empty stream, unknown header, a
///   format outside [`Format`], or a header that does not parse
/// * `Err(ImageError::Io)` - Reading the header failed
pub async fn detect_format<R: AsyncRead + Unpin>(
    reader: R,
) -> Result<(Format, ReplayReader<R>), ImageError> {
    let mut probe = ProbeReader::new(reader);
    let mut window = MAX_PROBE_BYTES;
    let format = classify_header(probe.probe(window).await?)?;

    loop {
        let header = probe.buffered();
        let at_end = header.len() < window;

        match header_dimensions(header, format) {
            Ok((width, height)) => {
                debug!(
                    format = %format,
                    header_bytes = header.len(),
                    "Parsed {}x{} header",
                    width,
                    height
                );
                return Ok((format, probe.into_reader()));
            }
            Err(e) if at_end || window >= MAX_HEADER_BYTES => {
                return Err(ImageError::unsupported(format!(
                    "invalid {format} header: {e}"
                )));
            }
            Err(_) => {
                window = window.saturating_mul(2).min(MAX_HEADER_BYTES);
                probe.probe(window).await?;
            }
        }
    }
}

/// Classify leading bytes by their magic signature.
pub fn classify_header(header: &[u8]) -> Result<Format, ImageError> {
    if header.is_empty() {
        return Err(ImageError::unsupported("empty input"));
    }

    let detected = image::guess_format(header)
        .map_err(|e| ImageError::unsupported(format!("unrecognized header: {e}")))?;

    Format::from_image_format(detected)
        .ok_or_else(|| ImageError::unsupported(format!("{detected:?} is not handled")))
}

/// Parse the header in `buffer` as `format` and return `(width, height)`.
fn header_dimensions(buffer: &[u8], format: Format) -> image::ImageResult<(u32, u32)> {
    ImageReader::with_format(Cursor::new(buffer), format.to_image_format()).into_dimensions()
}

// =============================================================================
// Tests
// =============================================================================
