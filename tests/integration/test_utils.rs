//! Test utilities for integration tests.
//!
//! This module provides instrumented filesystem and stream wrappers, plus
//! helpers that synthesize encoded images with the `image` crate.

use std::io::{self, Cursor};
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use tokio::io::{AsyncRead, ReadBuf};

use imgcache::io::{FileReader, Filesystem, MemoryFs};
use imgcache::Format;

// =============================================================================
// Image Helpers
// =============================================================================

/// Create an RGB gradient image.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    }))
}

/// Create an RGB image of pseudo-random noise, which compresses poorly.
pub fn noise_image(width: u32, height: u32) -> DynamicImage {
    let mut state: u32 = 0x9E37_79B9;
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgb([r, g, b])
    }))
}

/// Create a half-transparent RGBA image.
pub fn translucent_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, _| {
        Rgba([200, (x % 256) as u8, 40, 128])
    }))
}

/// Encode `img` as `format`.
pub fn encode(img: &DynamicImage, format: Format) -> Vec<u8> {
    let img = match format {
        Format::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img.clone(),
    };
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format.to_image_format()).unwrap();
    buf.into_inner()
}

/// Encode an RGB gradient of the given size as `format`.
pub fn encoded_image(width: u32, height: u32, format: Format) -> Vec<u8> {
    encode(&gradient_image(width, height), format)
}

/// Decode `data` and return its dimensions.
pub fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).expect("output should decode");
    (img.width(), img.height())
}

// =============================================================================
// Tracking Reader
// =============================================================================

/// An `AsyncRead` wrapper that counts the bytes read through it.
pub struct TrackingReader<R> {
    inner: R,
    bytes_read: Arc<AtomicUsize>,
}

impl<R> TrackingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter, still readable after the reader is moved.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.bytes_read)
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for TrackingReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let result = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &result {
            this.bytes_read
                .fetch_add(buf.filled().len() - before, Ordering::SeqCst);
        }
        result
    }
}

// =============================================================================
// Instrumented Filesystems
// =============================================================================

/// A filesystem wrapper that records how many writes overlap in time.
///
/// Each write sleeps for `delay` while counted as active, so unserialized
/// writers would be observed overlapping.
#[derive(Clone)]
pub struct OverlapTrackingFs {
    inner: MemoryFs,
    delay: Duration,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl OverlapTrackingFs {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryFs::new(),
            delay,
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Highest number of writes observed in flight at once.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryFs {
        &self.inner
    }
}

#[async_trait]
impl Filesystem for OverlapTrackingFs {
    async fn open(&self, path: &Path) -> io::Result<FileReader> {
        self.inner.open(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        let result = self.inner.write(path, data).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.inner.remove_file(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path).await
    }

    fn identifier(&self) -> &str {
        "overlap-tracking"
    }
}

/// A filesystem where every operation fails with the given error kind.
#[derive(Clone, Copy)]
pub struct FailingFs {
    kind: io::ErrorKind,
}

impl FailingFs {
    pub fn new(kind: io::ErrorKind) -> Self {
        Self { kind }
    }

    fn fail<T>(&self) -> io::Result<T> {
        Err(io::Error::new(self.kind, "injected failure"))
    }
}

#[async_trait]
impl Filesystem for FailingFs {
    async fn open(&self, _path: &Path) -> io::Result<FileReader> {
        self.fail()
    }

    async fn write(&self, _path: &Path, _data: &[u8]) -> io::Result<()> {
        self.fail()
    }

    async fn remove_file(&self, _path: &Path) -> io::Result<()> {
        self.fail()
    }

    async fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        self.fail()
    }

    fn identifier(&self) -> &str {
        "failing"
    }
}
