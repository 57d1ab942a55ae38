//! # Software Display
//!
//! An in-process stand-in for a hardware compositor. Off-screen resources are
//! memory-mapped temporary files, and the single on-screen element is tracked
//! as a "scanout" handle that changes when a flip is applied.
//!
//! ## Completion Modes
//!
//! - [`CompletionMode::Immediate`]: the flip is applied and its completion
//!   invoked synchronously inside [`DisplayBackend::flip`].
//! - [`CompletionMode::Manual`]: flips queue up until someone calls
//!   [`SoftwareDisplay::complete_next_flip`], either a test or the vsync
//!   thread started with [`SoftwareDisplay::spawn_vsync`].
//!
//! The display also keeps counters that make misuse visible: writes into the
//! resource currently on screen, releases of resources that are still queued
//! for a flip, and releases of resources that were already released.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use memmap2::{MmapMut, MmapOptions};
use parking_lot::{Condvar, Mutex};

use super::{DisplayBackend, FlipCompletion, ResourceHandle};
use crate::config::PixelFormat;
use crate::error::{FlipError, Result};

/// How the display delivers flip completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    /// Complete every flip inside `flip` itself.
    Immediate,
    /// Queue flips until [`SoftwareDisplay::complete_next_flip`] is called.
    Manual,
}

struct DisplayState {
    resources: HashMap<u32, MmapMut>,
    released: HashSet<u32>,
    next_handle: u32,
    queued: VecDeque<(ResourceHandle, FlipCompletion)>,
    scanout: Option<ResourceHandle>,
    resource_limit: Option<usize>,
    presented: u64,
    writes_to_scanout: u64,
    in_flight_releases: u64,
    double_releases: u64,
}

/// Memory-backed display with a single on-screen element.
pub struct SoftwareDisplay {
    mode: CompletionMode,
    state: Mutex<DisplayState>,
    /// Signalled whenever a flip is queued in manual mode.
    flip_queued: Condvar,
}

impl SoftwareDisplay {
    /// Creates a display that delivers completions according to `mode`.
    pub fn new(mode: CompletionMode) -> Self {
        Self {
            mode,
            state: Mutex::new(DisplayState {
                resources: HashMap::new(),
                released: HashSet::new(),
                next_handle: 1,
                queued: VecDeque::new(),
                scanout: None,
                resource_limit: None,
                presented: 0,
                writes_to_scanout: 0,
                in_flight_releases: 0,
                double_releases: 0,
            }),
            flip_queued: Condvar::new(),
        }
    }

    /// Caps the number of live resources; allocations beyond it fail.
    pub fn with_resource_limit(self, limit: usize) -> Self {
        self.state.lock().resource_limit = Some(limit);
        self
    }

    pub fn mode(&self) -> CompletionMode {
        self.mode
    }

    /// Applies the oldest queued flip and invokes its completion on the
    /// calling thread. Returns `false` if no flip was queued.
    pub fn complete_next_flip(&self) -> bool {
        let (resource, on_complete) = {
            let mut state = self.state.lock();
            let Some((resource, on_complete)) = state.queued.pop_front() else {
                return false;
            };
            state.scanout = Some(resource);
            state.presented += 1;
            (resource, on_complete)
        };

        log::trace!("vsync: presenting {resource}");
        on_complete();
        true
    }

    /// Blocks until at least one flip is queued or `timeout` elapses.
    /// Returns whether a flip is queued.
    pub fn wait_for_pending_flip(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.queued.is_empty() {
            if self
                .flip_queued
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return !state.queued.is_empty();
            }
        }
        true
    }

    /// Starts a thread that completes at most one queued flip per refresh
    /// period, emulating a display refreshing at `refresh_hz`.
    ///
    /// Flips still queued when the thread is stopped are never completed,
    /// exactly like a display that stopped scanning out.
    pub fn spawn_vsync(self: &Arc<Self>, refresh_hz: u32) -> Result<VsyncHandle> {
        if refresh_hz == 0 {
            return Err(FlipError::config("refresh_hz", 0, "must be greater than 0"));
        }

        let period = Duration::from_secs(1) / refresh_hz;
        let stop = Arc::new(AtomicBool::new(false));
        let display = Arc::clone(self);
        let thread_stop = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("vsync".to_string())
            .spawn(move || {
                let mut next_tick = Instant::now() + period;
                while !thread_stop.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if next_tick > now {
                        thread::sleep(next_tick - now);
                    }
                    next_tick += period;
                    display.complete_next_flip();
                }
            })
            .map_err(|e| FlipError::io("spawn vsync thread", e))?;

        log::debug!("vsync thread started at {refresh_hz} Hz");
        Ok(VsyncHandle {
            stop,
            thread: Some(thread),
        })
    }

    /// Number of resources currently allocated.
    pub fn live_resources(&self) -> usize {
        self.state.lock().resources.len()
    }

    /// Number of flips issued but not yet applied.
    pub fn pending_flips(&self) -> usize {
        self.state.lock().queued.len()
    }

    /// The resource currently on screen.
    pub fn scanout(&self) -> Option<ResourceHandle> {
        self.state.lock().scanout
    }

    /// Copy of the pixels currently on screen.
    pub fn scanout_contents(&self) -> Option<Vec<u8>> {
        let state = self.state.lock();
        state
            .scanout
            .and_then(|handle| state.resources.get(&handle.0))
            .map(|map| map.to_vec())
    }

    /// Number of flips applied so far.
    pub fn presented(&self) -> u64 {
        self.state.lock().presented
    }

    /// Writes that landed in the resource on screen at the time.
    pub fn writes_to_scanout(&self) -> u64 {
        self.state.lock().writes_to_scanout
    }

    /// Releases of a resource that still had a flip queued against it.
    pub fn in_flight_releases(&self) -> u64 {
        self.state.lock().in_flight_releases
    }

    /// Releases of a resource that had already been released.
    pub fn double_releases(&self) -> u64 {
        self.state.lock().double_releases
    }
}

impl DisplayBackend for SoftwareDisplay {
    fn allocate(&self, format: PixelFormat, width: u32, height: u32) -> Result<ResourceHandle> {
        let mut state = self.state.lock();
        if let Some(limit) = state.resource_limit {
            if state.resources.len() >= limit {
                return Err(FlipError::io(
                    "allocate resource",
                    io::Error::new(
                        io::ErrorKind::OutOfMemory,
                        format!("resource limit of {limit} reached"),
                    ),
                ));
            }
        }

        let len = width as usize * height as usize * format.bytes_per_pixel();
        let file = tempfile::tempfile().map_err(|e| FlipError::io("create backing file", e))?;
        file.set_len(len as u64)
            .map_err(|e| FlipError::io("size backing file", e))?;
        // SAFETY: the file is private to this process and never resized after mapping.
        let map = unsafe { MmapOptions::new().map_mut(&file) }
            .map_err(|e| FlipError::io("map backing file", e))?;

        let handle = ResourceHandle(state.next_handle);
        state.next_handle += 1;
        state.resources.insert(handle.0, map);
        log::debug!("allocated {handle}: {width}x{height} {format} ({len} bytes)");
        Ok(handle)
    }

    fn write(&self, resource: ResourceHandle, pixels: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let on_screen = state.scanout == Some(resource);
        let map = state
            .resources
            .get_mut(&resource.0)
            .ok_or(FlipError::UnknownResource { handle: resource.0 })?;
        if map.len() != pixels.len() {
            return Err(FlipError::FrameSize {
                expected: map.len(),
                actual: pixels.len(),
            });
        }
        map.copy_from_slice(pixels);
        if on_screen {
            state.writes_to_scanout += 1;
        }
        Ok(())
    }

    fn flip(&self, resource: ResourceHandle, on_complete: FlipCompletion) {
        match self.mode {
            CompletionMode::Immediate => {
                {
                    let mut state = self.state.lock();
                    state.scanout = Some(resource);
                    state.presented += 1;
                }
                on_complete();
            }
            CompletionMode::Manual => {
                self.state.lock().queued.push_back((resource, on_complete));
                self.flip_queued.notify_all();
            }
        }
    }

    fn release(&self, resource: ResourceHandle) {
        let mut state = self.state.lock();
        if state.queued.iter().any(|(queued, _)| *queued == resource) {
            state.in_flight_releases += 1;
            log::error!("released {resource} while a flip to it is still queued");
        }

        if state.resources.remove(&resource.0).is_some() {
            state.released.insert(resource.0);
            if state.scanout == Some(resource) {
                state.scanout = None;
            }
            log::debug!("released {resource}");
        } else if state.released.contains(&resource.0) {
            state.double_releases += 1;
            log::error!("{resource} released twice");
        } else {
            log::warn!("release of unknown resource {resource}");
        }
    }
}

/// Stops the vsync thread when dropped.
pub struct VsyncHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl VsyncHandle {
    /// Stops the vsync thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("vsync thread panicked");
            }
        }
    }
}

impl Drop for VsyncHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
