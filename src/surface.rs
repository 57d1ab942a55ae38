//! # Surface
//!
//! A surface groups a page pool with two roles: the page on screen
//! (`current_page`) and the page being prepared for the next flip
//! (`next_page`). It is driven from two contexts:
//!
//! - **Producer** (render thread): [`Surface::submit_frame`] and
//!   [`Surface::teardown`]
//! - **Display** (vsync context): the completion closure registered with every
//!   flip, which runs `on_flip_complete`
//!
//! ## Frame Submission
//!
//! ```text
//!  write next_page ─▶ wait for no pending flip ─▶ mark pending ─▶ flip(next_page)
//!                                                                      │
//!                        next_page = acquire_free_page() ◀─────────────┘
//! ```
//!
//! Pixels are copied before any blocking so the time between "frame ready"
//! and "flip issued" stays small. The next page is acquired after the flip is
//! issued: if no page is free, the wait delays the preparation of the next
//! frame rather than the display of this one.
//!
//! ## Completion
//!
//! The completion frees the page it supersedes, promotes the flipped page to
//! `current_page`, and only then clears the pending flip and signals. Freeing
//! first lets a producer woken by the signal find the page just released.
//!
//! ## Single-Page Pools
//!
//! With one page there is nothing to acquire eagerly: the only page is the one
//! just flipped. Acquisition is deferred to the start of the next submission,
//! and the completion releases the page as soon as it is on screen. The next
//! frame is then written into the displayed page.
//!
//! ## Teardown
//!
//! Resources are released only after the outstanding flip (if any) has
//! completed. The completion closure holds its own reference to the shared
//! surface state, so the state itself always outlives it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::SurfaceConfig;
use crate::core::{FlipCoordinator, Page, PagePool, PageState};
use crate::display::{DisplayBackend, ResourceHandle};
use crate::error::{FlipError, Result};

/// State shared between the producer and the completion callback.
struct SurfaceShared {
    config: SurfaceConfig,
    pool: PagePool,
    /// Written only by `on_flip_complete`.
    current_page: Mutex<Option<usize>>,
    coordinator: Arc<FlipCoordinator>,
    backend: Arc<dyn DisplayBackend>,
}

impl SurfaceShared {
    fn on_flip_complete(&self, page: usize) {
        {
            let mut current = self.current_page.lock();
            if let Some(previous) = *current {
                if previous != page {
                    self.pool.page(previous).mark_free();
                }
            }
            *current = Some(page);
            if self.pool.len() == 1 {
                self.pool.page(page).mark_free();
            }
        }

        log::debug!("flip to page {page} completed");
        self.coordinator.finish_flip();
    }
}

/// A display output with its page pool.
pub struct Surface {
    shared: Arc<SurfaceShared>,
    /// `None` only for single-page pools between a flip and the next submit.
    next_page: Option<usize>,
    released: bool,
}

impl Surface {
    /// Allocates `config.page_count` pages on `backend`.
    ///
    /// Page 0 starts out claimed, as the target of the first frame.
    ///
    /// # Errors
    ///
    /// - [`FlipError::InvalidConfig`] if `config` does not validate
    /// - [`FlipError::ResourceAllocation`] if any page cannot be allocated.
    ///   Pages allocated before the failure are released again.
    pub fn configure(
        backend: Arc<dyn DisplayBackend>,
        coordinator: Arc<FlipCoordinator>,
        config: SurfaceConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut pages = Vec::with_capacity(config.page_count);
        for index in 0..config.page_count {
            match backend.allocate(config.pixel_format, config.width, config.height) {
                Ok(resource) => pages.push(Page::new(index, resource)),
                Err(e) => {
                    for page in &pages {
                        backend.release(page.resource());
                    }
                    return Err(FlipError::resource(index, e.to_string()));
                }
            }
        }

        let pool = PagePool::new(pages);
        pool.page(0).mark_used();

        log::info!(
            "configured surface {}x{} {} with {} pages",
            config.width,
            config.height,
            config.pixel_format,
            config.page_count
        );

        Ok(Self {
            shared: Arc::new(SurfaceShared {
                config,
                pool,
                current_page: Mutex::new(None),
                coordinator,
                backend,
            }),
            next_page: Some(0),
            released: false,
        })
    }

    /// Presents one frame.
    ///
    /// Blocks while a previous flip is outstanding, and again after issuing
    /// this flip until a page is free for the next frame.
    ///
    /// # Errors
    ///
    /// [`FlipError::FrameSize`] if `pixels` does not match the surface
    /// geometry; nothing is written or flipped in that case. Errors from the
    /// backend write are passed through, also before anything is flipped.
    pub fn submit_frame(&mut self, pixels: &[u8]) -> Result<()> {
        let expected = self.shared.config.frame_bytes();
        if pixels.len() != expected {
            return Err(FlipError::FrameSize {
                expected,
                actual: pixels.len(),
            });
        }

        let shared = &self.shared;
        let page = match self.next_page {
            Some(page) => page,
            None => {
                let page = shared.pool.acquire_free_page(&shared.coordinator).index();
                self.next_page = Some(page);
                page
            }
        };
        let resource = shared.pool.page(page).resource();

        shared.backend.write(resource, pixels)?;

        shared.coordinator.begin_flip();
        log::debug!("flipping to page {page} ({resource})");
        let completion_state = Arc::clone(shared);
        shared.backend.flip(
            resource,
            Box::new(move || completion_state.on_flip_complete(page)),
        );

        self.next_page = if shared.pool.len() > 1 {
            Some(shared.pool.acquire_free_page(&shared.coordinator).index())
        } else {
            None
        };
        Ok(())
    }

    /// Waits for the outstanding flip, then releases every page's resource.
    pub fn teardown(mut self) {
        self.release_pages();
    }

    fn release_pages(&mut self) {
        if self.released {
            return;
        }

        self.shared.coordinator.wait_idle();
        for page in self.shared.pool.iter() {
            self.shared.backend.release(page.resource());
        }
        self.released = true;
        log::info!("surface torn down, {} pages released", self.shared.pool.len());
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.shared.config
    }

    pub fn page_count(&self) -> usize {
        self.shared.pool.len()
    }

    /// Index of the page on screen, if any flip has completed yet.
    pub fn current_page(&self) -> Option<usize> {
        *self.shared.current_page.lock()
    }

    /// Index of the page that will receive the next frame, if already chosen.
    pub fn next_page(&self) -> Option<usize> {
        self.next_page
    }

    /// Resource backing page `index`.
    pub fn page_resource(&self, index: usize) -> ResourceHandle {
        self.shared.pool.page(index).resource()
    }

    /// State of every page, in pool order.
    pub fn page_states(&self) -> Vec<PageState> {
        let current = self.shared.current_page.lock();
        self.shared
            .pool
            .iter()
            .map(|page| {
                if *current == Some(page.index()) {
                    PageState::Displayed
                } else if page.is_used() {
                    PageState::Acquired
                } else {
                    PageState::Free
                }
            })
            .collect()
    }

    pub fn coordinator(&self) -> &Arc<FlipCoordinator> {
        &self.shared.coordinator
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.release_pages();
    }
}
