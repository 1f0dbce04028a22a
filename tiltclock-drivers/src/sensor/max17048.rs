//! MAX17048 fuel gauge (I2C)
//!
//! The gauge runs its ModelGauge algorithm on its own; the driver only
//! reads the two result registers. Both are big-endian.

use embedded_hal::i2c::I2c;
use tiltclock_core::traits::{FuelGauge, SensorError};

/// Fixed 7-bit bus address
pub const I2C_ADDRESS: u8 = 0x36;

pub mod reg {
    /// Cell voltage, 12-bit left aligned, 1.25 mV per LSB
    pub const VCELL: u8 = 0x02;
    /// State of charge, 1/256 % per LSB
    pub const SOC: u8 = 0x04;
    /// Production version
    pub const VERSION: u8 = 0x08;
}

/// MAX17048 driver
pub struct Max17048<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Max17048<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Give the bus handle back
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Production version register, useful as a presence probe
    pub fn version(&mut self) -> Result<u16, SensorError> {
        self.read_word(reg::VERSION)
    }

    fn read_word(&mut self, register: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(I2C_ADDRESS, &[register], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl<I2C: I2c> FuelGauge for Max17048<I2C> {
    fn state_of_charge_raw(&mut self) -> Result<u16, SensorError> {
        self.read_word(reg::SOC)
    }

    fn cell_voltage_mv(&mut self) -> Result<u16, SensorError> {
        let raw = u32::from(self.read_word(reg::VCELL)? >> 4);
        Ok((raw * 5 / 4) as u16)
    }
}
