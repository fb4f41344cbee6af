//! The closed set of image container formats the service handles.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;

// =============================================================================
// Format
// =============================================================================

/// Image container format.
///
/// Only these five formats are decoded or produced. Anything else detected
/// in a stream or requested by extension is reported as
/// [`ImageError::UnsupportedFormat`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JPEG / JFIF
    #[serde(alias = "jpg")]
    #[value(alias = "jpg")]
    Jpeg,

    /// Portable Network Graphics
    Png,

    /// Graphics Interchange Format (first frame only)
    Gif,

    /// Tagged Image File Format
    #[serde(alias = "tif")]
    #[value(alias = "tif")]
    Tiff,

    /// Windows bitmap
    Bmp,
}

/// Extension lookup table. Matching is case-insensitive.
const EXTENSIONS: &[(&str, Format)] = &[
    ("jpg", Format::Jpeg),
    ("jpeg", Format::Jpeg),
    ("png", Format::Png),
    ("gif", Format::Gif),
    ("tif", Format::Tiff),
    ("tiff", Format::Tiff),
    ("bmp", Format::Bmp),
];

impl Format {
    /// Every supported format.
    pub const ALL: [Format; 5] = [
        Format::Jpeg,
        Format::Png,
        Format::Gif,
        Format::Tiff,
        Format::Bmp,
    ];

    /// Lowercase name, as used in configuration.
    pub const fn name(&self) -> &'static str {
        match self {
            Format::Jpeg => "jpeg",
            Format::Png => "png",
            Format::Gif => "gif",
            Format::Tiff => "tiff",
            Format::Bmp => "bmp",
        }
    }

    /// Canonical file extension (without the dot).
    pub const fn extension(&self) -> &'static str {
        match self {
            Format::Jpeg => "jpg",
            Format::Png => "png",
            Format::Gif => "gif",
            Format::Tiff => "tif",
            Format::Bmp => "bmp",
        }
    }

    /// MIME type for HTTP responses.
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Format::Jpeg => "image/jpeg",
            Format::Png => "image/png",
            Format::Gif => "image/gif",
            Format::Tiff => "image/tiff",
            Format::Bmp => "image/bmp",
        }
    }

    /// Look up a format by file extension.
    ///
    /// A leading dot is ignored, so both `"png"` and `".png"` work.
    pub fn from_extension(ext: &str) -> Result<Format, ImageError> {
        let trimmed = ext.strip_prefix('.').unwrap_or(ext);
        EXTENSIONS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(trimmed))
            .map(|(_, format)| *format)
            .ok_or_else(|| ImageError::unsupported(format!("unknown extension {ext:?}")))
    }

    /// The matching `image` crate format.
    pub const fn to_image_format(&self) -> ImageFormat {
        match self {
            Format::Jpeg => ImageFormat::Jpeg,
            Format::Png => ImageFormat::Png,
            Format::Gif => ImageFormat::Gif,
            Format::Tiff => ImageFormat::Tiff,
            Format::Bmp => ImageFormat::Bmp,
        }
    }

    /// Map an `image` crate format onto this enum, if it is one we handle.
    pub fn from_image_format(format: ImageFormat) -> Option<Format> {
        match format {
            ImageFormat::Jpeg => Some(Format::Jpeg),
            ImageFormat::Png => Some(Format::Png),
            ImageFormat::Gif => Some(Format::Gif),
            ImageFormat::Tiff => Some(Format::Tiff),
            ImageFormat::Bmp => Some(Format::Bmp),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Format::Jpeg),
            "png" => Ok(Format::Png),
            "gif" => Ok(Format::Gif),
            "tiff" | "tif" => Ok(Format::Tiff),
            "bmp" => Ok(Format::Bmp),
            _ => Err(ImageError::unsupported(format!("unknown format name {s:?}"))),
        }
    }
}

/// Look up a format by file extension.
///
/// Free-function form of [`Format::from_extension`].
pub fn format_from_extension(ext: &str) -> Result<Format, ImageError> {
    Format::from_extension(ext)
}

// =============================================================================
// Tests
// =============================================================================
