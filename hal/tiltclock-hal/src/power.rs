//! Power control abstractions
//!
//! Everything the sleep sequence needs from the platform: processor clock
//! scaling, the display power rail, the display bus pins, the tilt wake
//! source and the light-sleep primitive itself.

use embedded_hal::delay::DelayNs;

/// Processor clock settings used by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CpuClock {
    /// Reduced clock used while entering and leaving sleep (20 MHz)
    Low,
    /// Normal operating clock (160 MHz)
    Normal,
}

impl CpuClock {
    /// Frequency in MHz
    pub fn mhz(self) -> u32 {
        match self {
            CpuClock::Low => 20,
            CpuClock::Normal => 160,
        }
    }
}

/// Cause of the most recent reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ResetReason {
    Unknown = 0,
    PowerOn = 1,
    External = 2,
    Software = 3,
    Panic = 4,
    InterruptWatchdog = 5,
    TaskWatchdog = 6,
    Watchdog = 7,
    DeepSleep = 8,
    Brownout = 9,
    Sdio = 10,
    Usb = 11,
    Jtag = 12,
    Efuse = 13,
    PowerGlitch = 14,
    CpuLockup = 15,
}

impl ResetReason {
    /// Numeric code as stored in the statistics record
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a stored reason code
    pub fn from_code(code: u8) -> Option<Self> {
        use ResetReason::*;
        let reason = match code {
            0 => Unknown,
            1 => PowerOn,
            2 => External,
            3 => Software,
            4 => Panic,
            5 => InterruptWatchdog,
            6 => TaskWatchdog,
            7 => Watchdog,
            8 => DeepSleep,
            9 => Brownout,
            10 => Sdio,
            11 => Usb,
            12 => Jtag,
            13 => Efuse,
            14 => PowerGlitch,
            15 => CpuLockup,
            _ => return None,
        };
        Some(reason)
    }

    /// Whether retained memory must be considered lost after this reset
    ///
    /// Watchdog, software and deep-sleep resets keep the retained region;
    /// everything else starts the statistics over.
    pub fn is_hard(self) -> bool {
        !matches!(
            self,
            ResetReason::Software
                | ResetReason::InterruptWatchdog
                | ResetReason::TaskWatchdog
                | ResetReason::Watchdog
                | ResetReason::DeepSleep
        )
    }

    /// Short label for the info screen
    pub fn label(self) -> &'static str {
        use ResetReason::*;
        match self {
            Unknown => "UNKNOWN",
            PowerOn => "POWERON",
            External => "EXT",
            Software => "SW",
            Panic => "PANIC",
            InterruptWatchdog => "IWDG",
            TaskWatchdog => "TWDG",
            Watchdog => "WDT",
            DeepSleep => "DEEPSLP",
            Brownout => "BROWN",
            Sdio => "SDIO",
            Usb => "USB",
            Jtag => "JTAG",
            Efuse => "EFUSE",
            PowerGlitch => "PWRGL",
            CpuLockup => "CPU",
        }
    }
}

/// Platform power control
///
/// The delay supertrait provides the short settle waits between the
/// steps of the sleep sequence.
pub trait PowerControl: DelayNs {
    /// Cause of the reset that started this boot
    fn reset_reason(&mut self) -> ResetReason;

    /// Switch the processor clock
    fn set_cpu_clock(&mut self, clock: CpuClock);

    /// Switch the display power rail
    fn set_display_rail(&mut self, on: bool);

    /// Put the display bus pins into high impedance
    fn release_display_bus(&mut self);

    /// Return the display bus pins to their driven state
    fn restore_display_bus(&mut self);

    /// Arm the motion sensor tilt line as the only wake source
    fn arm_tilt_wake(&mut self);

    /// Enter light sleep
    ///
    /// Blocks until the armed wake source fires. There is no timeout.
    fn light_sleep(&mut self);
}
