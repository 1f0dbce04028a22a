//! Step accumulator
//!
//! The pedometer only exposes a 16-bit free running counter. Every
//! reading, whether prompted by the step interrupt or by the watchdog
//! poll, goes through [`StepAccumulator::reconcile`] so wraparounds are
//! folded into a 32-bit running total. Today's count is the total minus
//! the baseline captured at the last midnight.
//!
//! The total and baseline are written to flash only when both enough time
//! and enough steps have passed since the last write; the midnight reset
//! is written straight away.

use serde::{Deserialize, Serialize};
use tiltclock_hal::{RecordStore, StorageKey};

use crate::config::WatchConfig;
use crate::fmt::{debug, info, warn};
use crate::state::InterruptFlags;
use crate::traits::MotionSensor;

/// Upper bound of an encoded step record
const MAX_RECORD_SIZE: usize = 16;

/// Persisted step state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepRecord {
    /// Incremented on every write
    pub version: u32,
    /// Running total at the time of the write
    pub hardware_total: u32,
    /// Total at the start of the day
    pub baseline: u32,
}

/// Wraparound-aware step counter
#[derive(Debug, Clone)]
pub struct StepAccumulator {
    /// Running total of hardware steps
    total: u32,
    /// Total at the start of the day
    baseline: u32,
    /// Last raw counter value seen
    last_raw: u16,
    /// Version of the last record written or restored
    version: u32,
    last_persist_ms: u32,
    last_persist_total: u32,
    last_poll_ms: u32,
    persist_interval_ms: u32,
    persist_min_delta: u32,
    watchdog_ms: u32,
}

impl StepAccumulator {
    /// Restore from flash and continue from the live counter value
    ///
    /// Without a stored record the live value becomes both total and
    /// baseline, so today starts at zero.
    pub fn initialize<S: RecordStore>(
        store: &mut S,
        snapshot: u16,
        now_ms: u32,
        config: &WatchConfig,
    ) -> Self {
        let (total, baseline, version) = match Self::load(store) {
            Some(record) => {
                let baseline = record.baseline.min(record.hardware_total);
                if baseline != record.baseline {
                    warn!(
                        "Step baseline {} above total {}, clamped",
                        record.baseline, record.hardware_total
                    );
                }
                info!(
                    "Steps restored: total {} baseline {} v{}",
                    record.hardware_total, baseline, record.version
                );
                (record.hardware_total, baseline, record.version)
            }
            None => {
                info!("No step record, starting from counter {}", snapshot);
                (u32::from(snapshot), u32::from(snapshot), 0)
            }
        };

        Self {
            total,
            baseline,
            last_raw: snapshot,
            version,
            last_persist_ms: now_ms,
            last_persist_total: total,
            last_poll_ms: now_ms,
            persist_interval_ms: config.step_persist_min_interval_ms,
            persist_min_delta: config.step_persist_min_delta,
            watchdog_ms: config.step_watchdog_ms,
        }
    }

    fn load<S: RecordStore>(store: &mut S) -> Option<StepRecord> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = store.read(StorageKey::StepRecord, &mut buf).ok()?;
        postcard::from_bytes(&buf[..len]).ok()
    }

    /// Fold a raw counter reading into the running total
    pub fn reconcile(&mut self, raw: u16) {
        let delta = if raw < self.last_raw {
            0x1_0000 - u32::from(self.last_raw) + u32::from(raw)
        } else {
            u32::from(raw - self.last_raw)
        };
        self.total = self.total.wrapping_add(delta);
        self.last_raw = raw;
    }

    /// Handle a pending step interrupt
    ///
    /// The sensor's latch is read before the flag is cleared, then the
    /// counter is read and reconciled. A failed counter read leaves the
    /// total unchanged.
    pub fn service_interrupt<M: MotionSensor, S: RecordStore>(
        &mut self,
        flags: &InterruptFlags,
        sensor: &mut M,
        store: &mut S,
        now_ms: u32,
    ) {
        if !flags.step_raised() {
            return;
        }
        if let Err(e) = sensor.acknowledge_step() {
            debug!("Step status read failed: {:?}", e);
        }
        flags.take_step();
        self.read_counter(sensor, store, now_ms);
    }

    /// Forced counter read at the watchdog cadence
    pub fn poll_watchdog<M: MotionSensor, S: RecordStore>(
        &mut self,
        sensor: &mut M,
        store: &mut S,
        now_ms: u32,
    ) {
        if now_ms.wrapping_sub(self.last_poll_ms) < self.watchdog_ms {
            return;
        }
        self.last_poll_ms = now_ms;
        self.read_counter(sensor, store, now_ms);
    }

    fn read_counter<M: MotionSensor, S: RecordStore>(
        &mut self,
        sensor: &mut M,
        store: &mut S,
        now_ms: u32,
    ) {
        match sensor.step_count() {
            Ok(raw) => {
                self.reconcile(raw);
                self.maybe_persist(store, now_ms);
            }
            Err(e) => debug!("Step counter read failed: {:?}", e),
        }
    }

    /// Start a new day at the current total and persist immediately
    pub fn reset_daily_baseline<S: RecordStore>(&mut self, store: &mut S, now_ms: u32) {
        self.baseline = self.total;
        info!("Daily step baseline reset at {}", self.total);
        self.persist(store, now_ms);
    }

    /// Running hardware total
    pub fn hardware_total(&self) -> u32 {
        self.total
    }

    /// Total at the start of the day
    pub fn baseline(&self) -> u32 {
        self.baseline
    }

    /// Steps since the baseline, zero while the baseline is ahead
    pub fn today(&self) -> u32 {
        self.total.saturating_sub(self.baseline)
    }

    /// Version of the most recent record
    pub fn version(&self) -> u32 {
        self.version
    }

    fn maybe_persist<S: RecordStore>(&mut self, store: &mut S, now_ms: u32) {
        let waited = now_ms.wrapping_sub(self.last_persist_ms) >= self.persist_interval_ms;
        let walked =
            self.total.wrapping_sub(self.last_persist_total) >= self.persist_min_delta;
        if waited && walked {
            self.persist(store, now_ms);
        }
    }

    fn persist<S: RecordStore>(&mut self, store: &mut S, now_ms: u32) {
        let record = StepRecord {
            version: self.version.wrapping_add(1),
            hardware_total: self.total,
            baseline: self.baseline,
        };
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let result = match postcard::to_slice(&record, &mut buf) {
            Ok(bytes) => store.write(StorageKey::StepRecord, bytes),
            Err(_) => return,
        };

        match result {
            Ok(()) => {
                self.version = record.version;
                self.last_persist_ms = now_ms;
                self.last_persist_total = self.total;
                debug!("Step record v{} written", record.version);
            }
            Err(e) => warn!("Step record write failed: {:?}", e),
        }
    }
}
