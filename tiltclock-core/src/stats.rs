//! System statistics
//!
//! Reset, sync and screen counters kept in retained memory so they
//! survive soft resets. The ledger carries a RAM-only version number that
//! moves on every mutation; the info page compares it against the version
//! it last painted to decide whether it is stale.

use serde::{Deserialize, Serialize};
use tiltclock_hal::{ResetReason, RetainedRegion, RetainedSlot};

use crate::calendar::CalendarTime;
use crate::fmt::{info, warn};
use crate::persist::{self, RetainedRecord};

/// "HSTS"
pub const STATS_MAGIC: u32 = 0x4853_5453;

/// Counters shown on the info page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemStats {
    pub hard_resets: u32,
    pub soft_resets: u32,
    pub sync_successes: u32,
    pub sync_failures: u32,
    /// Times the screen was woken from sleep
    pub screen_wakes: u32,
    /// Time set by the most recent successful sync
    pub last_sync: Option<CalendarTime>,
    /// [`ResetReason`] code of the current boot
    pub last_reset_reason: u8,
}

impl SystemStats {
    /// Decoded reset reason, if the code is known
    pub fn reset_reason(&self) -> Option<ResetReason> {
        ResetReason::from_code(self.last_reset_reason)
    }
}

impl RetainedRecord for SystemStats {
    const SLOT: RetainedSlot = RetainedSlot::SystemStats;
    const MAGIC: u32 = STATS_MAGIC;

    fn is_valid(&self) -> bool {
        self.last_sync.map_or(true, |t| t.validate().is_ok())
    }
}

/// Statistics plus their change counter
#[derive(Debug, Clone)]
pub struct StatsLedger {
    stats: SystemStats,
    version: u32,
}

impl StatsLedger {
    /// Load the retained statistics and count this boot
    ///
    /// A hard reset starts the counters over with one hard reset; any
    /// other reset bumps the soft reset count. An unreadable record is
    /// treated as zeroed.
    pub fn boot<R: RetainedRegion>(region: &mut R, reason: ResetReason) -> Self {
        let mut stats = match persist::load::<_, SystemStats>(region) {
            Ok(stats) => stats,
            Err(e) => {
                info!("Statistics record unusable ({:?}), zeroed", e);
                SystemStats::default()
            }
        };

        if reason.is_hard() {
            stats = SystemStats {
                hard_resets: 1,
                ..SystemStats::default()
            };
        } else {
            stats.soft_resets = stats.soft_resets.saturating_add(1);
            stats.hard_resets = stats.hard_resets.max(1);
        }
        stats.last_reset_reason = reason.code();
        info!(
            "Boot after {:?}: {} hard, {} soft",
            reason, stats.hard_resets, stats.soft_resets
        );

        let mut ledger = Self { stats, version: 0 };
        ledger.commit(region);
        ledger
    }

    /// Current statistics
    pub fn stats(&self) -> &SystemStats {
        &self.stats
    }

    /// Change counter, bumped on every mutation
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn record_sync_success<R: RetainedRegion>(&mut self, region: &mut R, time: CalendarTime) {
        self.stats.sync_successes = self.stats.sync_successes.saturating_add(1);
        self.stats.last_sync = Some(time);
        self.commit(region);
    }

    pub fn record_sync_failure<R: RetainedRegion>(&mut self, region: &mut R) {
        self.stats.sync_failures = self.stats.sync_failures.saturating_add(1);
        self.commit(region);
    }

    pub fn record_screen_wake<R: RetainedRegion>(&mut self, region: &mut R) {
        self.stats.screen_wakes = self.stats.screen_wakes.saturating_add(1);
        self.commit(region);
    }

    fn commit<R: RetainedRegion>(&mut self, region: &mut R) {
        self.version = self.version.wrapping_add(1);
        if let Err(e) = persist::store(region, &self.stats) {
            warn!("Statistics persist failed: {:?}", e);
        }
    }
}
