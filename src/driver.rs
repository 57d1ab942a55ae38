//! # Video Driver Interface
//!
//! [`VideoDriver`] is what the surrounding emulator frontend talks to. It owns
//! the one flip coordinator for the lifetime of the process and at most one
//! surface at a time, and exposes the three calls the frontend needs:
//! configure (on mode set or resize), submit a frame, and tear down.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pageflip::config::{PixelFormat, SurfaceConfig};
//! use pageflip::display::{CompletionMode, SoftwareDisplay};
//! use pageflip::driver::VideoDriver;
//!
//! let display = Arc::new(SoftwareDisplay::new(CompletionMode::Immediate));
//! let mut driver = VideoDriver::new(display.clone());
//!
//! driver.configure(SurfaceConfig::new(8, 8, PixelFormat::Rgb565, 2))?;
//! driver.submit_frame(&[0u8; 8 * 8 * 2])?;
//! driver.teardown();
//!
//! assert_eq!(display.live_resources(), 0);
//! # Ok::<(), pageflip::FlipError>(())
//! ```

use std::sync::Arc;

use crate::config::SurfaceConfig;
use crate::core::{FlipCoordinator, FlipStats};
use crate::display::DisplayBackend;
use crate::error::{FlipError, Result};
use crate::surface::Surface;

/// Process-wide owner of the flip coordinator and the active surface.
pub struct VideoDriver {
    backend: Arc<dyn DisplayBackend>,
    coordinator: Arc<FlipCoordinator>,
    surface: Option<Surface>,
}

impl VideoDriver {
    pub fn new(backend: Arc<dyn DisplayBackend>) -> Self {
        Self {
            backend,
            coordinator: Arc::new(FlipCoordinator::new()),
            surface: None,
        }
    }

    /// Builds a surface for `config`, replacing the existing one.
    ///
    /// The configuration is validated first; an invalid one leaves the current
    /// surface in place. Otherwise the current surface is torn down (waiting
    /// for its outstanding flip) before the new pages are allocated. If
    /// allocation fails no surface remains.
    pub fn configure(&mut self, config: SurfaceConfig) -> Result<()> {
        config.validate()?;

        if let Some(surface) = self.surface.take() {
            log::info!("reconfiguring display surface");
            surface.teardown();
        }

        let surface = Surface::configure(
            Arc::clone(&self.backend),
            Arc::clone(&self.coordinator),
            config,
        )?;
        self.surface = Some(surface);
        Ok(())
    }

    /// Presents one frame on the active surface.
    ///
    /// # Errors
    ///
    /// [`FlipError::NotConfigured`] if no surface exists, otherwise whatever
    /// [`Surface::submit_frame`] reports.
    pub fn submit_frame(&mut self, pixels: &[u8]) -> Result<()> {
        self.surface
            .as_mut()
            .ok_or(FlipError::NotConfigured)?
            .submit_frame(pixels)
    }

    /// Tears down the active surface, if any.
    pub fn teardown(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.teardown();
        }
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.surface.is_some()
    }

    pub fn stats(&self) -> FlipStats {
        self.coordinator.stats()
    }
}

impl Drop for VideoDriver {
    fn drop(&mut self) {
        self.teardown();
    }
}
