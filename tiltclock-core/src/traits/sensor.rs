//! Motion sensor and fuel gauge traits
//!
//! All calls are synchronous and may fail. The runtime treats a failure
//! as "no new data this poll" and tries again on its next cadence.

use thiserror::Error;

/// Errors from sensor access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed
    #[error("sensor bus error")]
    Bus,
    /// Identity register did not match
    #[error("unexpected device id {0:#04x}")]
    WrongDevice(u8),
}

/// Accelerometer output data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleRate {
    /// Low rate while the screen is dark (26 Hz)
    Reduced,
    /// Normal rate while the screen is on (104 Hz)
    Normal,
}

/// Inertial sensor with pedometer and tilt detection
pub trait MotionSensor {
    /// Read the 16-bit free running step counter
    fn step_count(&mut self) -> Result<u16, SensorError>;

    /// Read the status register that latches the step interrupt
    fn acknowledge_step(&mut self) -> Result<(), SensorError>;

    /// Read the status registers that latch the tilt interrupt
    fn acknowledge_tilt(&mut self) -> Result<(), SensorError>;

    /// Change the accelerometer data rate
    fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), SensorError>;
}

/// Battery fuel gauge
pub trait FuelGauge {
    /// State of charge in 1/256 percent units
    fn state_of_charge_raw(&mut self) -> Result<u16, SensorError>;

    /// Cell voltage in millivolts
    fn cell_voltage_mv(&mut self) -> Result<u16, SensorError>;
}
