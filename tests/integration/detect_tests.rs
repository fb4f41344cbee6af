//! Format detection integration tests.
//!
//! Tests verify:
//! - Real encoded images of every supported format are classified
//! - The returned stream replays the input byte for byte
//! - Detection reads no more than the probe window when the header fits in it
//! - Unknown and unhandled formats and corrupt headers are rejected

use std::io::Cursor;
use std::sync::atomic::Ordering;

use tokio::io::AsyncReadExt;

use imgcache::{detect_format, Format, MAX_PROBE_BYTES};

use super::test_utils::{encode, encoded_image, noise_image, TrackingReader};

async fn read_all<R: tokio::io::AsyncRead + Unpin>(mut reader: R) -> Vec<u8> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn test_detect_every_supported_format() {
    for format in Format::ALL {
        let data = encoded_image(32, 24, format);
        let (detected, reader) = detect_format(Cursor::new(data.clone())).await.unwrap();

        assert_eq!(detected, format);
        assert_eq!(read_all(reader).await, data, "{}", format);
    }
}

#[tokio::test]
async fn test_png_stream_replayed_in_full() {
    let data = encode(&noise_image(128, 128), Format::Png);
    assert!(data.len() > MAX_PROBE_BYTES);

    let (detected, reader) = detect_format(Cursor::new(data.clone())).await.unwrap();
    assert_eq!(detected, Format::Png);
    assert_eq!(read_all(reader).await, data);
}

#[tokio::test]
async fn test_detection_reads_only_probe_window() {
    let data = encoded_image(256, 256, Format::Bmp);
    assert!(data.len() > MAX_PROBE_BYTES);

    let tracked = TrackingReader::new(Cursor::new(data.clone()));
    let bytes_read = tracked.counter();

    let (detected, reader) = detect_format(tracked).await.unwrap();
    assert_eq!(detected, Format::Bmp);
    assert_eq!(bytes_read.load(Ordering::SeqCst), MAX_PROBE_BYTES);
    let (replayed, _) = reader.get_ref();
    assert_eq!(replayed.get_ref().len(), MAX_PROBE_BYTES);

    assert_eq!(read_all(reader).await, data);
    assert_eq!(bytes_read.load(Ordering::SeqCst), data.len());
}

#[tokio::test]
async fn test_unhandled_formats_rejected() {
    let webp = b"RIFF\x1a\x00\x00\x00WEBPVP8L\x0d\x00\x00\x00\x2f\x00\x00\x00".to_vec();
    let err = detect_format(Cursor::new(webp)).await.unwrap_err();
    assert!(err.is_unsupported_format());

    let text = b"just some text that is not an image".to_vec();
    let err = detect_format(Cursor::new(text)).await.unwrap_err();
    assert!(err.is_unsupported_format());

    let err = detect_format(Cursor::new(Vec::new())).await.unwrap_err();
    assert!(err.is_unsupported_format());
}

#[tokio::test]
async fn test_corrupt_png_header_rejected() {
    let mut data = encoded_image(64, 48, Format::Png);
    // Overwrite the IHDR payload and its CRC, keeping the signature
    for byte in &mut data[16..33] {
        *byte = 0xA5;
    }

    let err = detect_format(Cursor::new(data)).await.unwrap_err();
    assert!(err.is_unsupported_format(), "{:?}", err);
}

#[tokio::test]
async fn test_truncated_header_rejected() {
    for format in Format::ALL {
        let data = encoded_image(32, 24, format);
        let err = detect_format(Cursor::new(data[..6].to_vec()))
            .await
            .unwrap_err();
        assert!(err.is_unsupported_format(), "{}: {:?}", format, err);
    }
}
