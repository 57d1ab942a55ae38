//! # Page Pool
//!
//! A fixed set of pages allocated when a surface is configured. Unlike a
//! general-purpose buffer pool it never grows: when every page is claimed,
//! acquisition blocks until a flip completes and frees one.

use super::coordinator::FlipCoordinator;
use super::page::Page;

/// Fixed-size collection of pages.
#[derive(Debug)]
pub struct PagePool {
    pages: Vec<Page>,
}

impl PagePool {
    pub(crate) fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, index: usize) -> &Page {
        &self.pages[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Claims a free page, blocking until one exists.
    ///
    /// The scan runs under the coordinator lock, and the completion callback
    /// frees its page before taking that lock to signal. A page freed while
    /// the scan is in progress is therefore either seen by the scan or
    /// followed by a signal that arrives after this thread is waiting, so no
    /// wakeup is lost. Every wakeup rescans.
    ///
    /// There is no timeout. If the display never completes a flip, this
    /// blocks forever.
    pub fn acquire_free_page(&self, coordinator: &FlipCoordinator) -> &Page {
        let mut state = coordinator.lock();
        let mut blocked = false;
        loop {
            if let Some(page) = self.pages.iter().find(|page| page.try_claim()) {
                log::debug!("acquired page {}", page.index());
                return page;
            }

            if !blocked {
                blocked = true;
                state.stats.page_waits += 1;
                log::trace!("no free page, waiting for a flip to complete");
            }
            coordinator.wait(&mut state);
        }
    }
}
