//! Common test utilities for the page-flip integration tests
//!
//! Surfaces here are always 4x4 RGB565 (32-byte frames) on a software display,
//! which is small enough that every frame can be compared byte for byte.

#![allow(dead_code)]

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use pageflip::config::{PixelFormat, SurfaceConfig};
use pageflip::core::FlipCoordinator;
use pageflip::display::{CompletionMode, SoftwareDisplay};
use pageflip::surface::Surface;

/// How long a thread must stay put before we call it blocked
pub const BLOCKED_GRACE: Duration = Duration::from_millis(100);

/// Upper bound for anything that is expected to happen
pub const PATIENCE: Duration = Duration::from_secs(10);

/// Geometry used by every test surface
pub fn test_config(pages: usize) -> SurfaceConfig {
    SurfaceConfig::new(4, 4, PixelFormat::Rgb565, pages)
}

/// Create a surface with its own coordinator on a fresh software display
pub fn test_surface(mode: CompletionMode, pages: usize) -> (Arc<SoftwareDisplay>, Surface) {
    let display = Arc::new(SoftwareDisplay::new(mode));
    let surface = Surface::configure(
        display.clone(),
        Arc::new(FlipCoordinator::new()),
        test_config(pages),
    )
    .expect("failed to configure test surface");
    (display, surface)
}

/// A frame where every byte is `value`
pub fn solid_frame(value: u8) -> Vec<u8> {
    vec![value; test_config(1).frame_bytes()]
}

/// Poll `condition` until it holds or `PATIENCE` runs out
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + PATIENCE;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Assert that a spawned thread is still running after a grace period
pub fn assert_blocked<T>(handle: &JoinHandle<T>, what: &str) {
    thread::sleep(BLOCKED_GRACE);
    assert!(!handle.is_finished(), "{what} returned without blocking");
}
