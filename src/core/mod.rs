//! # Core Synchronization Module
//!
//! The pieces shared between the render thread and the display's completion
//! context: pages and their pool, and the coordinator that enforces the
//! single-outstanding-flip rule.

pub mod coordinator;
pub mod page;
pub mod page_pool;

pub use coordinator::{FlipCoordinator, FlipStats};
pub use page::{Page, PageState};
pub use page_pool::PagePool;
