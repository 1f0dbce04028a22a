//! When to start a sync attempt
//!
//! Hourly after a success. After a failure the retry is quick (one
//! minute) until the first success since boot, slower (five minutes)
//! afterwards. The first attempt is due right at boot.

use super::{SyncMailbox, SyncOutcome, SyncWorker};
use crate::config::WatchConfig;
use crate::fmt::{debug, info, warn};

/// Sync timing state, owned by the main loop
#[derive(Debug, Clone)]
pub struct SyncScheduler {
    next_due_ms: u32,
    force: bool,
    ever_synced: bool,
    interval_ms: u32,
    retry_ms: u32,
    quick_retry_ms: u32,
    scan_window_s: u32,
}

impl SyncScheduler {
    /// First attempt due at `now_ms`
    pub fn new(config: &WatchConfig, now_ms: u32) -> Self {
        Self {
            next_due_ms: now_ms,
            force: false,
            ever_synced: false,
            interval_ms: config.sync_interval_ms,
            retry_ms: config.sync_retry_ms,
            quick_retry_ms: config.sync_quick_retry_ms,
            scan_window_s: config.sync_scan_window_s,
        }
    }

    /// Make the next [`SyncScheduler::service`] start an attempt
    pub fn request_immediate(&mut self) {
        self.force = true;
    }

    pub fn next_due_ms(&self) -> u32 {
        self.next_due_ms
    }

    /// Whether any attempt succeeded since boot
    pub fn ever_synced(&self) -> bool {
        self.ever_synced
    }

    /// Drain a finished attempt and start the next one when due
    ///
    /// Does nothing while a worker is outstanding. Returns the drained
    /// outcome, which the caller applies to the clock and statistics.
    pub fn service<W: SyncWorker>(
        &mut self,
        now_ms: u32,
        mailbox: &'static SyncMailbox,
        worker: &mut W,
    ) -> Option<SyncOutcome> {
        if mailbox.is_running() {
            return None;
        }

        let outcome = mailbox.try_take();
        if let Some(outcome) = &outcome {
            self.schedule_after(outcome, now_ms);
        }

        if self.force {
            self.force = false;
            self.next_due_ms = now_ms;
        }
        // Not yet due, robust to uptime wrap
        if (now_ms.wrapping_sub(self.next_due_ms) as i32) < 0 {
            return outcome;
        }

        if !mailbox.try_claim() {
            return outcome;
        }
        match worker.spawn(mailbox, self.scan_window_s) {
            Ok(()) => debug!("Sync worker started"),
            Err(e) => {
                warn!("{:?}, retrying soon", e);
                mailbox.release();
                self.next_due_ms = now_ms.wrapping_add(self.quick_retry_ms);
            }
        }
        outcome
    }

    fn schedule_after(&mut self, outcome: &SyncOutcome, now_ms: u32) {
        let delay = match outcome {
            Ok(_) => {
                self.ever_synced = true;
                self.interval_ms
            }
            Err(_) if self.ever_synced => self.retry_ms,
            Err(_) => self.quick_retry_ms,
        };
        self.next_due_ms = now_ms.wrapping_add(delay);
        info!("Next sync in {} s", delay / 1000);
    }
}
