//! Battery monitor
//!
//! Polls the fuel gauge at a fixed cadence. The first poll after boot
//! happens on the first tick. A failed read keeps the previous values.

use crate::fmt::debug;
use crate::traits::FuelGauge;

/// Last values read from the fuel gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryReading {
    /// State of charge, 0-100
    pub percent: u8,
    /// Cell voltage in millivolts, 0 until the first good read
    pub millivolts: u16,
}

/// Periodic fuel gauge poller
#[derive(Debug, Clone)]
pub struct BatteryMonitor {
    reading: BatteryReading,
    last_poll_ms: Option<u32>,
    period_ms: u32,
}

impl BatteryMonitor {
    pub fn new(period_ms: u32) -> Self {
        Self {
            reading: BatteryReading::default(),
            last_poll_ms: None,
            period_ms,
        }
    }

    /// Poll the gauge if due
    ///
    /// Returns true when the percentage changed.
    pub fn poll<G: FuelGauge>(&mut self, gauge: &mut G, now_ms: u32) -> bool {
        if let Some(last) = self.last_poll_ms {
            if now_ms.wrapping_sub(last) < self.period_ms {
                return false;
            }
        }
        self.last_poll_ms = Some(now_ms);

        let before = self.reading.percent;
        match gauge.state_of_charge_raw() {
            Ok(raw) => self.reading.percent = percent_from_raw(raw),
            Err(e) => debug!("Fuel gauge SOC read failed: {:?}", e),
        }
        match gauge.cell_voltage_mv() {
            Ok(mv) => self.reading.millivolts = mv,
            Err(e) => debug!("Fuel gauge VCELL read failed: {:?}", e),
        }
        self.reading.percent != before
    }

    pub fn reading(&self) -> BatteryReading {
        self.reading
    }

    pub fn percent(&self) -> u8 {
        self.reading.percent
    }
}

/// 1/256 % units to a rounded whole percentage, clamped to 100
pub fn percent_from_raw(raw: u16) -> u8 {
    let rounded = (u32::from(raw) + 128) >> 8;
    rounded.min(100) as u8
}
