//! Current Time Service characteristic codec
//!
//! Field checks here are the wire-level ones: month 1-12, day 1-31,
//! hours/minutes/seconds in range, year at least 1900. Calendar checks
//! that need the month length belong to whoever turns the value into a
//! calendar date.

use thiserror::Error;

/// 16-bit UUID of the Current Time Service
pub const CTS_SERVICE_UUID: u16 = 0x1805;

/// 16-bit UUID of the Current Time characteristic
pub const CURRENT_TIME_CHAR_UUID: u16 = 0x2A2B;

/// Minimum accepted payload length (year through seconds)
pub const MIN_PAYLOAD_LEN: usize = 7;

/// Full characteristic length
pub const FULL_PAYLOAD_LEN: usize = 10;

/// Errors from decoding a Current Time value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CtsError {
    /// Fewer than seven bytes
    #[error("payload too short ({0} bytes)")]
    TooShort(usize),
    /// Year before 1900
    #[error("year out of range")]
    Year,
    /// Month outside 1-12
    #[error("month out of range")]
    Month,
    /// Day outside 1-31
    #[error("day out of range")]
    Day,
    /// Hours, minutes or seconds out of range
    #[error("time of day out of range")]
    TimeOfDay,
}

/// Decoded Current Time value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentTime {
    /// Full year, e.g. 2024
    pub year: u16,
    /// Month 1-12
    pub month: u8,
    /// Day of month 1-31
    pub day: u8,
    /// Hours 0-23
    pub hours: u8,
    /// Minutes 0-59
    pub minutes: u8,
    /// Seconds 0-59
    pub seconds: u8,
    /// Weekday 0-6 with 0 = Sunday, `None` when the peer left it unknown
    pub weekday: Option<u8>,
}

impl CurrentTime {
    /// Decode a characteristic value
    pub fn decode(data: &[u8]) -> Result<Self, CtsError> {
        if data.len() < MIN_PAYLOAD_LEN {
            return Err(CtsError::TooShort(data.len()));
        }

        let year = u16::from_le_bytes([data[0], data[1]]);
        let month = data[2];
        let day = data[3];
        let hours = data[4];
        let minutes = data[5];
        let seconds = data[6];

        if year < 1900 {
            return Err(CtsError::Year);
        }
        if !(1..=12).contains(&month) {
            return Err(CtsError::Month);
        }
        if !(1..=31).contains(&day) {
            return Err(CtsError::Day);
        }
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return Err(CtsError::TimeOfDay);
        }

        // Wire weekday is 1 = Monday .. 7 = Sunday, 0 = unknown
        let weekday = match data.get(7).copied() {
            Some(7) => Some(0),
            Some(dow @ 1..=6) => Some(dow),
            _ => None,
        };

        Ok(Self {
            year,
            month,
            day,
            hours,
            minutes,
            seconds,
            weekday,
        })
    }

    /// Encode as a full ten byte characteristic value
    ///
    /// Fractions and adjust reason are written as zero.
    pub fn encode(&self) -> [u8; FULL_PAYLOAD_LEN] {
        let year = self.year.to_le_bytes();
        let dow = match self.weekday {
            Some(0) => 7,
            Some(d) if d <= 6 => d,
            _ => 0,
        };
        [
            year[0],
            year[1],
            self.month,
            self.day,
            self.hours,
            self.minutes,
            self.seconds,
            dow,
            0,
            0,
        ]
    }
}
