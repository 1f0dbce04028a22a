//! Calendar arithmetic
//!
//! Gregorian calendar time with one-second stepping. Advancing the clock
//! walks second by second so month lengths, leap days and the weekday
//! all go through the same increment logic. Realistic sleeps are hours
//! long, so the loop stays in the tens of thousands of iterations.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiltclock_protocol::CurrentTime;

include!(concat!(env!("OUT_DIR"), "/build_time.rs"));

/// Earliest supported year
pub const MIN_YEAR: u16 = 1970;

/// Latest supported year
pub const MAX_YEAR: u16 = 2200;

/// Weekday names indexed from Sunday
pub const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Field that failed the range check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalendarError {
    #[error("year out of range")]
    Year,
    #[error("month out of range")]
    Month,
    #[error("day out of range")]
    Day,
    #[error("hour out of range")]
    Hour,
    #[error("minute out of range")]
    Minute,
    #[error("second out of range")]
    Second,
    #[error("weekday out of range")]
    Weekday,
}

/// Wall-clock date and time
///
/// Every constructor runs [`CalendarTime::validate`], so a value obtained
/// through the public API is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    weekday: u8,
}

impl CalendarTime {
    /// 1970-01-01 00:00:00, a Thursday
    pub const EPOCH: Self = Self {
        year: 1970,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
        weekday: 4,
    };

    /// Build a time, computing the weekday from the date
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, CalendarError> {
        // Range-check the date before Zeller sees it
        if !(1..=12).contains(&month) {
            return Err(CalendarError::Month);
        }
        let weekday = weekday_from_date(year, month, day);
        Self::with_weekday(year, month, day, hour, minute, second, weekday)
    }

    /// Build a time with a caller supplied weekday (0 = Sunday)
    pub fn with_weekday(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        weekday: u8,
    ) -> Result<Self, CalendarError> {
        let time = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            weekday,
        };
        time.validate()?;
        Ok(time)
    }

    /// Convert a decoded Current Time value
    ///
    /// An unknown weekday is computed from the date.
    pub fn from_current_time(time: &CurrentTime) -> Result<Self, CalendarError> {
        match time.weekday {
            Some(weekday) => Self::with_weekday(
                time.year,
                time.month,
                time.day,
                time.hours,
                time.minutes,
                time.seconds,
                weekday,
            ),
            None => Self::new(
                time.year,
                time.month,
                time.day,
                time.hours,
                time.minutes,
                time.seconds,
            ),
        }
    }

    /// Range-check every field
    pub fn validate(&self) -> Result<(), CalendarError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(CalendarError::Year);
        }
        if !(1..=12).contains(&self.month) {
            return Err(CalendarError::Month);
        }
        if self.day == 0 || self.day > days_in_month(self.year, self.month) {
            return Err(CalendarError::Day);
        }
        if self.hour > 23 {
            return Err(CalendarError::Hour);
        }
        if self.minute > 59 {
            return Err(CalendarError::Minute);
        }
        if self.second > 59 {
            return Err(CalendarError::Second);
        }
        if self.weekday > 6 {
            return Err(CalendarError::Weekday);
        }
        Ok(())
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// Month 1-12
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Day of month starting at 1
    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Weekday 0-6 with 0 = Sunday
    pub fn weekday(&self) -> u8 {
        self.weekday
    }

    /// Three letter weekday name
    pub fn weekday_name(&self) -> &'static str {
        WEEKDAY_NAMES[usize::from(self.weekday % 7)]
    }

    /// Advance by one second
    ///
    /// Returns true when the date rolled over to the next day.
    pub fn tick_second(&mut self) -> bool {
        self.second += 1;
        if self.second < 60 {
            return false;
        }
        self.second = 0;

        self.minute += 1;
        if self.minute < 60 {
            return false;
        }
        self.minute = 0;

        self.hour += 1;
        if self.hour < 24 {
            return false;
        }
        self.hour = 0;

        self.weekday = (self.weekday + 1) % 7;
        self.day += 1;
        if self.day > days_in_month(self.year, self.month) {
            self.day = 1;
            self.month += 1;
            if self.month > 12 {
                self.month = 1;
                self.year = self.year.saturating_add(1);
            }
        }
        true
    }

    /// Advance by `seconds`, returning the number of day rollovers
    pub fn add_seconds(&mut self, seconds: u32) -> u32 {
        let mut rollovers = 0;
        for _ in 0..seconds {
            if self.tick_second() {
                rollovers += 1;
            }
        }
        rollovers
    }
}

/// Gregorian leap year rule
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in a month (1-12) of the given year
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Weekday of a date via Zeller's congruence, 0 = Sunday
///
/// `month` must be 1-12.
pub fn weekday_from_date(year: u16, month: u8, day: u8) -> u8 {
    // The calendar repeats every 400 years; the shift keeps `y - 1` positive
    let (mut y, mut m) = (u32::from(year) + 400, u32::from(month));
    if m < 3 {
        m += 12;
        y -= 1;
    }
    let k = y % 100;
    let j = y / 100;
    // Zeller yields 0 = Saturday
    let h = (u32::from(day) + 13 * (m + 1) / 5 + k + k / 4 + j / 4 + 5 * j) % 7;
    ((h + 6) % 7) as u8
}

/// UTC time at which this crate was built
pub fn build_time() -> CalendarTime {
    let (year, month, day, hour, minute, second) = BUILD_TIME;
    CalendarTime::new(year, month, day, hour, minute, second).unwrap_or(CalendarTime::EPOCH)
}
