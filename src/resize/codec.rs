//! Image decoding and encoding.
//!
//! # Design Decisions
//!
//! - **Orientation is baked in**: EXIF orientation is applied at decode time,
//!   so every later step works on upright pixels and the output carries no
//!   orientation tag.
//!
//! - **Encoder-compatible pixel layouts**: Some encoders reject some layouts
//!   (JPEG has no alpha channel, GIF and BMP are 8-bit only). Images are
//!   converted to the nearest layout the target accepts before encoding.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageDecoder, ImageReader};

use crate::error::ImageError;
use crate::format::Format;

/// Stateless decoder/encoder for the supported formats.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {}

impl Transcoder {
    /// Create a new transcoder.
    pub fn new() -> Self {
        Self {}
    }

    /// Decode `source` as `format` and apply its EXIF orientation.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Decode`] if the data is not a valid image of
    /// that format.
    pub fn decode(&self, source: &[u8], format: Format) -> Result<DynamicImage, ImageError> {
        let reader = ImageReader::with_format(Cursor::new(source), format.to_image_format());

        let mut decoder = reader.into_decoder().map_err(decode_error)?;
        let orientation = decoder.orientation().map_err(decode_error)?;
        let mut img = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
        img.apply_orientation(orientation);

        Ok(img)
    }

    /// Encode `img` as `format`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Encode`] if the encoder fails.
    pub fn encode(&self, img: DynamicImage, format: Format) -> Result<Bytes, ImageError> {
        let img = prepare_for_encoding(img, format);

        let mut output = Cursor::new(Vec::new());
        img.write_to(&mut output, format.to_image_format())
            .map_err(|e| ImageError::Encode {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output.into_inner()))
    }
}

fn decode_error(e: image::ImageError) -> ImageError {
    ImageError::Decode {
        message: e.to_string(),
    }
}

/// Convert `img` to a pixel layout the encoder for `format` accepts.
fn prepare_for_encoding(img: DynamicImage, format: Format) -> DynamicImage {
    match format {
        Format::Jpeg => match img {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        },
        Format::Gif => match img {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        },
        Format::Bmp => match img {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => img,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        },
        Format::Tiff => match img {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageRgba16(_) => img,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        },
        Format::Png => match img {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                DynamicImage::ImageRgba8(img.to_rgba8())
            }
            other => other,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
