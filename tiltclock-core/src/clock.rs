//! Persistent wall clock
//!
//! Keeps calendar time against a millisecond uptime anchor and mirrors
//! it into retained memory so a soft reset resumes from the last known
//! time instead of the build timestamp.

use serde::{Deserialize, Serialize};
use tiltclock_hal::{RetainedRegion, RetainedSlot};

use crate::calendar::{build_time, CalendarTime};
use crate::fmt::{info, warn};
use crate::persist::{self, RetainedRecord};

/// "TIME"
pub const CLOCK_MAGIC: u32 = 0x5449_4D45;

/// Retained form of the wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ClockRecord(CalendarTime);

impl RetainedRecord for ClockRecord {
    const SLOT: RetainedSlot = RetainedSlot::WallClock;
    const MAGIC: u32 = CLOCK_MAGIC;

    fn is_valid(&self) -> bool {
        self.0.validate().is_ok()
    }
}

/// Where the time came from at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockOrigin {
    /// Valid record found in retained memory
    Restored,
    /// No valid record; started from the build timestamp
    Fallback,
}

/// Result of catching the clock up with elapsed uptime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Advance {
    /// Whole seconds applied to the calendar
    pub seconds: u32,
    /// Midnights crossed
    pub day_rollovers: u32,
}

/// Wall clock anchored to the uptime counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistentClock {
    time: CalendarTime,
    /// Uptime at which `time` was exact
    anchor_ms: u32,
}

impl PersistentClock {
    /// Restore the clock from retained memory or fall back to build time
    pub fn initialize<R: RetainedRegion>(region: &mut R, now_ms: u32) -> (Self, ClockOrigin) {
        match persist::load::<_, ClockRecord>(region) {
            Ok(ClockRecord(time)) => {
                info!("Clock restored: {:?}", time);
                (
                    Self {
                        time,
                        anchor_ms: now_ms,
                    },
                    ClockOrigin::Restored,
                )
            }
            Err(e) => {
                let time = build_time();
                info!("Clock record unusable ({:?}), using build time", e);
                let clock = Self {
                    time,
                    anchor_ms: now_ms,
                };
                clock.persist(region);
                (clock, ClockOrigin::Fallback)
            }
        }
    }

    /// Current calendar time as of the last advance
    pub fn now(&self) -> CalendarTime {
        self.time
    }

    /// Uptime the calendar time is anchored to
    pub fn anchor_ms(&self) -> u32 {
        self.anchor_ms
    }

    /// Replace the time, re-anchor to `now_ms` and persist
    pub fn set_time<R: RetainedRegion>(&mut self, region: &mut R, time: CalendarTime, now_ms: u32) {
        self.time = time;
        self.anchor_ms = now_ms;
        self.persist(region);
    }

    /// Apply the whole seconds elapsed since the anchor
    ///
    /// The anchor moves by whole seconds only, so the sub-second remainder
    /// carries into the next call. Persists when at least one second was
    /// applied.
    pub fn advance<R: RetainedRegion>(&mut self, region: &mut R, now_ms: u32) -> Advance {
        let elapsed_ms = now_ms.wrapping_sub(self.anchor_ms);
        let seconds = elapsed_ms / 1000;
        if seconds == 0 {
            return Advance::default();
        }

        self.anchor_ms = self.anchor_ms.wrapping_add(seconds * 1000);
        let day_rollovers = self.time.add_seconds(seconds);
        self.persist(region);

        Advance {
            seconds,
            day_rollovers,
        }
    }

    fn persist<R: RetainedRegion>(&self, region: &mut R) {
        if let Err(e) = persist::store(region, &ClockRecord(self.time)) {
            warn!("Clock persist failed: {:?}", e);
        }
    }
}
