//! Hand-off between the sync worker and the main loop
//!
//! `running` guards against a second worker being started while one is
//! outstanding. The worker signals its outcome before it clears the
//! guard, so once the loop sees the guard down the outcome is visible.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};

use super::SyncOutcome;

/// Single-outstanding guard plus completion channel
pub struct SyncMailbox {
    running: AtomicBool,
    outcome: Signal<CriticalSectionRawMutex, SyncOutcome>,
}

impl SyncMailbox {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            outcome: Signal::new(),
        }
    }

    /// Claim the guard; false if a worker is already outstanding
    pub fn try_claim(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Drop the guard without an outcome, after a failed spawn
    pub fn release(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Whether a worker is outstanding
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Publish the outcome and drop the guard (worker side)
    pub fn complete(&self, outcome: SyncOutcome) {
        self.outcome.signal(outcome);
        self.running.store(false, Ordering::Release);
    }

    /// Take a published outcome, if any (loop side)
    pub fn try_take(&self) -> Option<SyncOutcome> {
        self.outcome.try_take()
    }
}

impl Default for SyncMailbox {
    fn default() -> Self {
        Self::new()
    }
}
