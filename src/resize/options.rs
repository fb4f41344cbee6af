//! Resize configuration: mode, quality, and output format.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::format::Format;

// =============================================================================
// ResizeMode
// =============================================================================

/// Geometric policy for fitting a source image to the target box.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Scale to fit inside the box, preserving aspect ratio. No cropping.
    #[default]
    Fit,

    /// Scale to cover the box, then crop around the center to fill it exactly.
    Fill,
}

impl ResizeMode {
    /// Lowercase name, as used in configuration.
    pub const fn name(&self) -> &'static str {
        match self {
            ResizeMode::Fit => "fit",
            ResizeMode::Fill => "fill",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResizeMode {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fit" => Ok(ResizeMode::Fit),
            "fill" => Ok(ResizeMode::Fill),
            _ => Err(ImageError::InvalidOption {
                kind: "resize mode",
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Quality
// =============================================================================

/// Resampling quality. Higher quality costs more compute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Lanczos (a=3) convolution
    High,

    /// Box (area-averaging) filter
    #[default]
    Medium,

    /// Nearest neighbor
    Low,
}

impl Quality {
    /// Lowercase name, as used in configuration.
    pub const fn name(&self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }

    /// The resampling filter used at this quality.
    pub const fn resample_filter(&self) -> ResampleFilter {
        match self {
            Quality::High => ResampleFilter::Lanczos3,
            Quality::Medium => ResampleFilter::Box,
            Quality::Low => ResampleFilter::Nearest,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quality {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Quality::High),
            "medium" => Ok(Quality::Medium),
            "low" => Ok(Quality::Low),
            _ => Err(ImageError::InvalidOption {
                kind: "quality",
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// ResampleFilter
// =============================================================================

/// Interpolation kernel used when scaling pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResampleFilter {
    /// Lanczos windowed sinc, a=3
    Lanczos3,

    /// Box filter: each output pixel averages the source area it covers
    Box,

    /// Nearest neighbor
    Nearest,
}

impl ResampleFilter {
    /// The `image` convolution filter, or `None` for area averaging,
    /// which `image` implements as a separate sampler.
    pub const fn convolution(&self) -> Option<FilterType> {
        match self {
            ResampleFilter::Lanczos3 => Some(FilterType::Lanczos3),
            ResampleFilter::Nearest => Some(FilterType::Nearest),
            ResampleFilter::Box => None,
        }
    }
}

// =============================================================================
// ResizeOptions
// =============================================================================

/// Per-request resize settings.
///
/// Defaults: output format = the detected source format, mode = [`ResizeMode::Fit`],
/// quality = [`Quality::Medium`].
///
/// # Example
///
/// ```
/// use imgcache::format::Format;
/// use imgcache::resize::{Quality, ResizeMode, ResizeOptions};
///
/// let options = ResizeOptions::new()
///     .with_mode(ResizeMode::Fill)
///     .with_quality(Quality::High)
///     .with_format(Format::Png);
///
/// let resolved = options.resolve(Format::Jpeg);
/// assert_eq!(resolved.format, Format::Png);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeOptions {
    /// Output format; `None` keeps the source format
    pub format: Option<Format>,

    /// Geometric policy
    pub mode: ResizeMode,

    /// Resampling quality
    pub quality: Quality,
}

impl ResizeOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the output format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Override the resize mode.
    pub fn with_mode(mut self, mode: ResizeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the resampling quality.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Fill in the output format from the detected source format.
    pub fn resolve(&self, detected: Format) -> ResolvedOptions {
        ResolvedOptions {
            format: self.format.unwrap_or(detected),
            mode: self.mode,
            quality: self.quality,
        }
    }
}

/// Resize settings with every default applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Output format
    pub format: Format,

    /// Geometric policy
    pub mode: ResizeMode,

    /// Resampling quality
    pub quality: Quality,
}

// =============================================================================
// Tests
// =============================================================================
