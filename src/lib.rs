//! # Page Flip Synchronization
//!
//! Presents freshly rendered frames on a hardware-composited display that
//! accepts at most one outstanding asynchronous page flip. A render thread
//! produces frames; the display reports each completed flip from its own
//! vsync-driven context. This crate coordinates the two so that:
//!
//! - no second flip is issued while one is outstanding
//! - a page is never written while it is on screen or in flight
//! - a surface is never torn down while a flip still references it
//!
//! ## Architecture
//!
//! - `core`: pages, the page pool, and the flip coordinator
//! - `surface`: submit/complete/teardown protocol for one display output
//! - `driver`: process-wide entry point used by the video frontend
//! - `display`: the backend seam plus an in-process software display
//! - `config`: surface geometry and validation
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pageflip::config::SurfaceConfig;
//! use pageflip::display::{CompletionMode, SoftwareDisplay};
//! use pageflip::driver::VideoDriver;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let display = Arc::new(SoftwareDisplay::new(CompletionMode::Manual));
//! let _vsync = display.spawn_vsync(60)?;
//!
//! let config = SurfaceConfig::default();
//! let mut driver = VideoDriver::new(display.clone());
//! driver.configure(config)?;
//!
//! let frame = vec![0u8; config.frame_bytes()];
//! for _ in 0..60 {
//!     driver.submit_frame(&frame)?;
//! }
//! driver.teardown();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod display;
pub mod driver;
pub mod error;
pub mod surface;

pub use config::{PixelFormat, SurfaceConfig};
pub use crate::core::{FlipCoordinator, FlipStats, PageState};
pub use driver::VideoDriver;
pub use error::{FlipError, Result};
pub use surface::Surface;
