//! # Pages
//!
//! A page is one off-screen resource plus a `used` flag. The flag has its own
//! lock because it is touched from two contexts: the producer claims a page
//! during acquisition, and the completion callback frees the page it just
//! superseded on screen.
//!
//! ```text
//!   FREE ──acquire──▶ ACQUIRED ──flip completes──▶ DISPLAYED
//!    ▲                                                │
//!    └──────────── a later flip completes ────────────┘
//! ```

use parking_lot::Mutex;

use crate::display::ResourceHandle;

/// Observable state of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Available for acquisition.
    Free,
    /// Claimed by the producer: being written, or flipped and awaiting vsync.
    Acquired,
    /// On screen.
    Displayed,
}

/// One flip target.
#[derive(Debug)]
pub struct Page {
    index: usize,
    resource: ResourceHandle,
    used: Mutex<bool>,
}

impl Page {
    pub(crate) fn new(index: usize, resource: ResourceHandle) -> Self {
        Self {
            index,
            resource,
            used: Mutex::new(false),
        }
    }

    /// Position of this page in its pool.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The off-screen resource this page owns.
    pub fn resource(&self) -> ResourceHandle {
        self.resource
    }

    pub fn is_used(&self) -> bool {
        *self.used.lock()
    }

    /// Sets `used` if the page is free. Returns whether the claim succeeded.
    pub(crate) fn try_claim(&self) -> bool {
        let mut used = self.used.lock();
        if *used {
            return false;
        }
        *used = true;
        true
    }

    /// Marks the page as claimed without checking. Only valid while nothing
    /// else can observe the page.
    pub(crate) fn mark_used(&self) {
        *self.used.lock() = true;
    }

    pub(crate) fn mark_free(&self) {
        *self.used.lock() = false;
    }
}
