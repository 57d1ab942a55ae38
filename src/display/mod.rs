//! # Display Backend Interface
//!
//! The composition subsystem is an external collaborator. The synchronizer
//! only needs four things from it: allocate an off-screen resource, write
//! pixels into it, flip the on-screen element to it, and release it.
//!
//! Flip completion is delivered through a [`FlipCompletion`] closure that the
//! backend invokes from whatever context it likes (a vsync thread, a driver
//! callback, or synchronously inside [`DisplayBackend::flip`]). Because the
//! closure is `FnOnce`, a backend cannot fire the same completion twice.

use std::fmt;

use crate::config::PixelFormat;
use crate::error::Result;

pub mod software;

pub use software::{CompletionMode, SoftwareDisplay, VsyncHandle};

/// Opaque handle to an off-screen resource owned by the display backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub u32);

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Completion notification for one flip. Invoked exactly once, at the
/// vertical sync where the flip took effect.
pub type FlipCompletion = Box<dyn FnOnce() + Send + 'static>;

/// Operations consumed from the display/composition subsystem.
pub trait DisplayBackend: Send + Sync {
    /// Allocates an off-screen resource of the given format and size.
    fn allocate(&self, format: PixelFormat, width: u32, height: u32) -> Result<ResourceHandle>;

    /// Copies `pixels` into the resource. The length must match the
    /// resource size exactly.
    fn write(&self, resource: ResourceHandle, pixels: &[u8]) -> Result<()>;

    /// Retargets the on-screen element to `resource` at the next vsync and
    /// invokes `on_complete` once that has happened.
    fn flip(&self, resource: ResourceHandle, on_complete: FlipCompletion);

    /// Releases a resource. The resource must not be on screen or in flight.
    fn release(&self, resource: ResourceHandle);
}
