//! # Flip Coordinator
//!
//! The display accepts at most one outstanding asynchronous flip. The
//! coordinator enforces that with a pending count in `{0, 1}` guarded by one
//! mutex, and owns the condition variable that both the producer and the
//! completion callback use to hand control back and forth.
//!
//! ## Lock Discipline
//!
//! | Field | Guarded by | Written by |
//! |-------|------------|------------|
//! | `pending` | coordinator mutex | producer (0 → 1), completion (1 → 0) |
//! | statistics | coordinator mutex | producer and completion |
//! | `Page::used` | that page's own mutex | producer (claim), completion (free) |
//!
//! The producer may take a page lock while holding the coordinator lock; the
//! completion callback never nests them. That fixes the lock order
//! coordinator → page.
//!
//! ## One Signal, Two Predicates
//!
//! A single condition variable carries two unrelated conditions: "no flip is
//! pending" (waited on before issuing a flip and during teardown) and "a page
//! may have been freed" (waited on during acquisition). Every completion
//! notifies all waiters, and every waiter re-checks its own predicate in a
//! loop, so spurious wakeups and wakeups meant for the other predicate are
//! harmless.

use parking_lot::{Condvar, Mutex, MutexGuard};

/// Counters describing the flip traffic seen by a coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlipStats {
    /// Flips handed to the display.
    pub flips_issued: u64,
    /// Completion callbacks received.
    pub flips_completed: u64,
    /// Times the producer found a flip outstanding and had to wait for it.
    pub pending_waits: u64,
    /// Times page acquisition found no free page and had to block.
    pub page_waits: u64,
    /// Highest pending count ever observed. Never above 1.
    pub peak_pending: u32,
}

/// State guarded by the coordinator mutex.
#[derive(Debug, Default)]
pub(crate) struct FlipState {
    pub(crate) pending: u32,
    pub(crate) stats: FlipStats,
}

/// Tracks the single outstanding flip and wakes whoever waits on it.
#[derive(Debug, Default)]
pub struct FlipCoordinator {
    state: Mutex<FlipState>,
    signal: Condvar,
}

impl FlipCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of outstanding flips (0 or 1).
    pub fn pending_count(&self) -> u32 {
        self.state.lock().pending
    }

    /// Snapshot of the flip counters.
    pub fn stats(&self) -> FlipStats {
        self.state.lock().stats
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, FlipState> {
        self.state.lock()
    }

    /// Releases the coordinator lock and sleeps until the next signal.
    /// Callers must re-check their predicate afterwards.
    pub(crate) fn wait(&self, state: &mut MutexGuard<'_, FlipState>) {
        self.signal.wait(state);
    }

    /// Waits until no flip is outstanding, then marks one as pending.
    ///
    /// The flip is counted pending before it is handed to the display so that
    /// a completion delivered synchronously from inside the display call still
    /// finds the count at 1.
    pub(crate) fn begin_flip(&self) {
        let mut state = self.state.lock();
        if state.pending > 0 {
            state.stats.pending_waits += 1;
            log::trace!("producer waiting for outstanding flip");
            while state.pending > 0 {
                self.signal.wait(&mut state);
            }
        }

        state.pending = 1;
        state.stats.flips_issued += 1;
        state.stats.peak_pending = state.stats.peak_pending.max(state.pending);
    }

    /// Clears the pending flip and wakes every waiter.
    pub(crate) fn finish_flip(&self) {
        let mut state = self.state.lock();
        debug_assert_eq!(state.pending, 1, "flip completed with none outstanding");
        state.pending = 0;
        state.stats.flips_completed += 1;
        self.signal.notify_all();
    }

    /// Blocks until no flip is outstanding. No timeout: a display that never
    /// completes the flip blocks the caller forever.
    pub fn wait_idle(&self) {
        let mut state = self.state.lock();
        while state.pending > 0 {
            log::trace!("waiting for outstanding flip before teardown");
            self.signal.wait(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_begin_and_finish() {
        let coordinator = FlipCoordinator::new();
        assert_eq!(coordinator.pending_count(), 0);

        coordinator.begin_flip();
        assert_eq!(coordinator.pending_count(), 1);

        coordinator.finish_flip();
        assert_eq!(coordinator.pending_count(), 0);
        coordinator.wait_idle();

        let stats = coordinator.stats();
        assert_eq!(stats.flips_issued, 1);
        assert_eq!(stats.flips_completed, 1);
        assert_eq!(stats.pending_waits, 0);
        assert_eq!(stats.peak_pending, 1);
    }

    #[test]
    fn test_second_flip_waits_for_completion() {
        let coordinator = Arc::new(FlipCoordinator::new());
        coordinator.begin_flip();

        let producer = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.begin_flip())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());
        assert_eq!(coordinator.pending_count(), 1);

        coordinator.finish_flip();
        producer.join().unwrap();

        let stats = coordinator.stats();
        assert_eq!(coordinator.pending_count(), 1);
        assert_eq!(stats.flips_issued, 2);
        assert_eq!(stats.pending_waits, 1);
        assert_eq!(stats.peak_pending, 1);
    }

    #[test]
    fn test_wait_idle_blocks_until_completion() {
        let coordinator = Arc::new(FlipCoordinator::new());
        coordinator.begin_flip();

        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.wait_idle())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());

        coordinator.finish_flip();
        waiter.join().unwrap();
    }
}
