//! Runtime configuration
//!
//! All timing and policy knobs of the runtime. The defaults are the
//! production values; a board may keep a postcard-encoded override in
//! flash under [`StorageKey::WatchConfig`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiltclock_hal::{RecordStore, StorageKey};

use crate::fmt::{info, warn};

/// Upper bound of an encoded configuration
pub const MAX_CONFIG_SIZE: usize = 80;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A period that drives a scheduler is zero
    #[error("{0} must be non-zero")]
    ZeroPeriod(&'static str),
    /// Retry intervals are not shorter than the sync period
    #[error("sync retry intervals must not exceed the sync period")]
    RetryOrdering,
    /// Stored override could not be decoded
    #[error("stored configuration is malformed")]
    Malformed,
}

/// Timing and policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchConfig {
    /// Display stays on this long after the last activity
    pub display_timeout_ms: u32,
    /// Backlight fade-out duration before the panel turns off
    pub fade_out_ms: u32,
    /// Backlight fade-in duration after wake
    pub fade_in_ms: u32,
    /// Backlight duty when fully on
    pub max_backlight_duty: u8,
    /// Button level must be stable this long to count
    pub button_settle_ms: u32,
    /// Fuel gauge poll period
    pub battery_poll_ms: u32,
    /// Forced step counter read period
    pub step_watchdog_ms: u32,
    /// Minimum time between step record writes
    pub step_persist_min_interval_ms: u32,
    /// Minimum step delta between step record writes
    pub step_persist_min_delta: u32,
    /// Sync period after a success
    pub sync_interval_ms: u32,
    /// Retry delay after a failure once a sync has succeeded
    pub sync_retry_ms: u32,
    /// Retry delay after a failure before any sync succeeded
    pub sync_quick_retry_ms: u32,
    /// Scan window of one sync attempt
    pub sync_scan_window_s: u32,
    /// Wait after releasing the display bus before cutting the rail
    pub bus_release_settle_ms: u32,
    /// Wait after restoring the display rail before touching the panel
    pub panel_power_settle_ms: u32,
}

impl WatchConfig {
    /// Production defaults
    pub const fn new() -> Self {
        Self {
            display_timeout_ms: 10_000,
            fade_out_ms: 1_000,
            fade_in_ms: 50,
            max_backlight_duty: 255,
            button_settle_ms: 50,
            battery_poll_ms: 60_000,
            step_watchdog_ms: 1_000,
            step_persist_min_interval_ms: 5 * 60 * 1000,
            step_persist_min_delta: 100,
            sync_interval_ms: 60 * 60 * 1000,
            sync_retry_ms: 5 * 60 * 1000,
            sync_quick_retry_ms: 60 * 1000,
            sync_scan_window_s: 5,
            bus_release_settle_ms: 2,
            panel_power_settle_ms: 5,
        }
    }

    /// Check the configuration for values the runtime cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            (self.display_timeout_ms, "display_timeout_ms"),
            (self.battery_poll_ms, "battery_poll_ms"),
            (self.step_watchdog_ms, "step_watchdog_ms"),
            (self.sync_interval_ms, "sync_interval_ms"),
            (self.sync_retry_ms, "sync_retry_ms"),
            (self.sync_quick_retry_ms, "sync_quick_retry_ms"),
            (self.sync_scan_window_s, "sync_scan_window_s"),
        ];
        for (value, name) in periods {
            if value == 0 {
                return Err(ConfigError::ZeroPeriod(name));
            }
        }

        if self.sync_quick_retry_ms > self.sync_retry_ms
            || self.sync_retry_ms > self.sync_interval_ms
        {
            return Err(ConfigError::RetryOrdering);
        }

        Ok(())
    }

    /// Decode and validate a stored override
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode for storage
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Malformed)
    }

    /// Load the stored override, falling back to the defaults
    pub fn load<S: RecordStore>(store: &mut S) -> Self {
        let mut buf = [0u8; MAX_CONFIG_SIZE];
        let len = match store.read(StorageKey::WatchConfig, &mut buf) {
            Ok(len) => len,
            Err(_) => return Self::new(),
        };

        match Self::from_bytes(&buf[..len]) {
            Ok(config) => {
                info!("Loaded stored configuration");
                config
            }
            Err(e) => {
                warn!("Ignoring stored configuration: {:?}", e);
                Self::new()
            }
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new()
    }
}
