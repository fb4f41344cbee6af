//! Configuration management for imgcache.
//!
//! This module provides the command-line interface:
//! - Subcommands via clap derive
//! - Environment variables with `IMGCACHE_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use imgcache::config::{Cli, Command};
//!
//! let cli = Cli::parse_from([
//!     "imgcache", "resize", "in.png", "out.jpg", "--width", "100", "--height", "80",
//! ]);
//!
//! match cli.command {
//!     Command::Resize(config) => assert_eq!(config.width, 100),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `IMGCACHE_WORKERS` - Concurrent resize pipelines (default: 4)
//! - `IMGCACHE_ROOT` - Cache root directory
//! - `RUST_LOG` - Overrides the log filter

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::error::ImageError;
use crate::format::{format_from_extension, Format};
use crate::resize::{Quality, ResizeMode, ResizeOptions, DEFAULT_WORKERS};

// =============================================================================
// CLI Arguments
// =============================================================================

/// imgcache - Image resizing and a content-addressed disk cache.
#[derive(Parser, Debug, Clone)]
#[command(name = "imgcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resize an image file.
    Resize(ResizeConfig),

    /// Detect the format of an image file.
    Detect(DetectConfig),

    /// Store, load or delete entries in a disk cache.
    Cache(CacheConfig),
}

// =============================================================================
// Resize
// =============================================================================

/// Arguments for `imgcache resize`.
#[derive(Args, Debug, Clone)]
pub struct ResizeConfig {
    /// Source image.
    pub input: PathBuf,

    /// Destination file.
    pub output: PathBuf,

    /// Target width in pixels.
    #[arg(long)]
    pub width: u32,

    /// Target height in pixels.
    #[arg(long)]
    pub height: u32,

    /// Geometric policy.
    #[arg(long, value_enum, default_value_t = ResizeMode::Fit)]
    pub mode: ResizeMode,

    /// Resampling quality.
    #[arg(long, value_enum, default_value_t = Quality::Medium)]
    pub quality: Quality,

    /// Output format.
    ///
    /// Defaults to the output file's extension, or the source format if the
    /// output has no extension.
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// Maximum number of concurrent resize pipelines.
    #[arg(long, default_value_t = DEFAULT_WORKERS, env = "IMGCACHE_WORKERS")]
    pub workers: usize,
}

impl ResizeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be greater than 0".to_string());
        }

        if self.workers == 0 {
            return Err("workers must be greater than 0".to_string());
        }

        self.output_format().map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Output format requested explicitly or by the output file's extension.
    ///
    /// `None` means the source format is kept.
    pub fn output_format(&self) -> Result<Option<Format>, ImageError> {
        if let Some(format) = self.format {
            return Ok(Some(format));
        }
        match self.output.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format_from_extension(ext).map(Some),
            None => Ok(None),
        }
    }

    /// Resize options described by this configuration.
    pub fn resize_options(&self) -> Result<ResizeOptions, ImageError> {
        let mut options = ResizeOptions::new()
            .with_mode(self.mode)
            .with_quality(self.quality);
        if let Some(format) = self.output_format()? {
            options = options.with_format(format);
        }
        Ok(options)
    }
}

// =============================================================================
// Detect
// =============================================================================

/// Arguments for `imgcache detect`.
#[derive(Args, Debug, Clone)]
pub struct DetectConfig {
    /// Image file to inspect.
    pub input: PathBuf,

    /// Print the result as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

// =============================================================================
// Cache
// =============================================================================

/// Arguments for `imgcache cache`.
#[derive(Args, Debug, Clone)]
pub struct CacheConfig {
    /// Cache root directory.
    #[arg(long, env = "IMGCACHE_ROOT")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub action: CacheAction,
}

/// Operations on a cache entry.
#[derive(Subcommand, Debug, Clone)]
pub enum CacheAction {
    /// Store a file's contents under a key.
    Store {
        /// Cache key.
        key: String,

        /// File whose contents are stored.
        file: PathBuf,
    },

    /// Load the contents stored under a key.
    Load {
        /// Cache key.
        key: String,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete the entry stored under a key.
    Delete {
        /// Cache key.
        key: String,
    },

    /// Print the file path a key maps to.
    Path {
        /// Cache key.
        key: String,
    },
}

impl CacheAction {
    /// The key this action operates on.
    pub fn key(&self) -> &str {
        match self {
            CacheAction::Store { key, .. }
            | CacheAction::Load { key, .. }
            | CacheAction::Delete { key }
            | CacheAction::Path { key } => key,
        }
    }
}

impl CacheConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.root.as_os_str().is_empty() {
            return Err("Cache root is required. Set --root or IMGCACHE_ROOT".to_string());
        }

        if self.action.key().is_empty() {
            return Err("Cache key must not be empty".to_string());
        }

        Ok(())
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

// =============================================================================
// Tests
// =============================================================================
