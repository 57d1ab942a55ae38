//! # Configuration Module
//!
//! Surface geometry and pool sizing. A [`SurfaceConfig`] is what the
//! surrounding video driver hands to [`crate::driver::VideoDriver::configure`]
//! whenever the display mode changes.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `width` | `u32` | 1-8192 | Surface width in pixels |
//! | `height` | `u32` | 1-8192 | Surface height in pixels |
//! | `pixel_format` | `PixelFormat` | see below | Layout of each pixel |
//! | `page_count` | `usize` | 1-8 | Off-screen pages in the pool |
//!
//! ## Pixel Formats
//!
//! - `rgb565`: 2 bytes per pixel, the usual choice for emulated consoles
//! - `xrgb8888`: 4 bytes per pixel, alpha ignored
//! - `argb8888`: 4 bytes per pixel
//!
//! ## Examples
//!
//! ```rust
//! use pageflip::config::{PixelFormat, SurfaceConfig};
//!
//! let config = SurfaceConfig::new(320, 240, PixelFormat::Rgb565, 3);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.frame_bytes(), 320 * 240 * 2);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{FlipError, Result};

/// Largest accepted surface edge, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// Largest accepted page pool.
pub const MAX_PAGES: usize = 8;

/// Pixel layout of an off-screen resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb565,
    Xrgb8888,
    Argb8888,
}

impl PixelFormat {
    /// Size of one pixel in bytes.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Xrgb8888 | Self::Argb8888 => 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rgb565 => "rgb565",
            Self::Xrgb8888 => "xrgb8888",
            Self::Argb8888 => "argb8888",
        };
        f.write_str(name)
    }
}

impl FromStr for PixelFormat {
    type Err = FlipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rgb565" => Ok(Self::Rgb565),
            "xrgb8888" => Ok(Self::Xrgb8888),
            "argb8888" => Ok(Self::Argb8888),
            _ => Err(FlipError::config(
                "pixel_format",
                s,
                "use one of: rgb565, xrgb8888, argb8888",
            )),
        }
    }
}

/// Geometry and pool size of a display surface.
///
/// # Field Descriptions
///
/// - `width`, `height`: surface size in pixels
/// - `pixel_format`: layout of every page's resource
/// - `page_count`: number of pages allocated up front. Two gives classic
///   double buffering; a third page lets the producer start the next frame
///   while one page is on screen and another waits for vsync. Only one flip
///   is ever outstanding, whatever the pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub page_count: usize,
}

impl SurfaceConfig {
    /// Creates a new configuration. Call [`validate`](Self::validate) before use.
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat, page_count: usize) -> Self {
        Self {
            width,
            height,
            pixel_format,
            page_count,
        }
    }

    /// Validates the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FlipError::InvalidConfig`] naming the first field out of range.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.width > MAX_DIMENSION {
            return Err(FlipError::config(
                "width",
                self.width,
                format!("must be between 1 and {MAX_DIMENSION}"),
            ));
        }
        if self.height == 0 || self.height > MAX_DIMENSION {
            return Err(FlipError::config(
                "height",
                self.height,
                format!("must be between 1 and {MAX_DIMENSION}"),
            ));
        }
        if self.page_count == 0 || self.page_count > MAX_PAGES {
            return Err(FlipError::config(
                "page_count",
                self.page_count,
                format!("must be between 1 and {MAX_PAGES}"),
            ));
        }
        Ok(())
    }

    /// Exact size in bytes of one frame for this surface.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.pixel_format.bytes_per_pixel()
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            pixel_format: PixelFormat::Rgb565,
            page_count: 2,
        }
    }
}
