//! LSM6DS3 inertial sensor (I2C)
//!
//! Only the embedded functions are used: the hardware pedometer keeps a
//! 16-bit step counter and raises INT1 on every detected step, and the
//! tilt detector raises INT2 when the wrist is turned up. Both interrupt
//! sources latch until their status registers are read.
//!
//! # Embedded function access
//!
//! The pedometer and tilt enable bits live in the embedded function
//! register bank, which is mapped over the normal bank while
//! `FUNC_CFG_ACCESS` is set. Every bank switch is undone before the
//! next normal register access.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use tiltclock_core::traits::{MotionSensor, SampleRate, SensorError};

/// 7-bit bus address with SA0 tied low
pub const I2C_ADDRESS: u8 = 0x6A;

/// Expected `WHO_AM_I` contents
pub const DEVICE_ID: u8 = 0x6A;

/// LSM6DS3 register addresses
pub mod reg {
    /// Embedded function bank select
    pub const FUNC_CFG_ACCESS: u8 = 0x01;
    /// Identity
    pub const WHO_AM_I: u8 = 0x0F;
    /// Accelerometer data rate and full scale
    pub const CTRL1_XL: u8 = 0x10;
    /// Reset, block data update, address auto increment
    pub const CTRL3_C: u8 = 0x12;
    /// Axis enables and embedded function enable
    pub const CTRL10_C: u8 = 0x19;
    /// Step counter, low byte (high byte follows)
    pub const STEP_COUNTER_L: u8 = 0x4B;
    /// Tilt interrupt source, read to clear
    pub const TILT_SRC: u8 = 0x52;
    /// Embedded function status, read to clear
    pub const FUNC_SRC: u8 = 0x53;
    /// Wake-up threshold
    pub const WAKE_UP_THS: u8 = 0x5B;
    /// Wake-up duration
    pub const WAKE_UP_DUR: u8 = 0x5C;
    /// INT1 routing
    pub const MD1_CFG: u8 = 0x5E;
    /// INT2 routing
    pub const MD2_CFG: u8 = 0x5F;

    /// Embedded bank: function enables A
    pub const EMB_FUNC_EN_A: u8 = 0x04;
    /// Embedded bank: function enables B
    pub const EMB_FUNC_EN_B: u8 = 0x05;
    /// Embedded bank: pedometer debounce
    pub const PEDO_DEB_REG: u8 = 0x2F;
}

/// Register bit fields
pub mod bits {
    pub const FUNC_CFG_EN: u8 = 0x80;

    pub const CTRL3_C_SW_RESET: u8 = 1 << 0;
    pub const CTRL3_C_IF_INC: u8 = 1 << 2;
    pub const CTRL3_C_BDU: u8 = 1 << 6;

    /// All three axes plus the embedded functions
    pub const CTRL10_C_AXES_FUNC: u8 = 0x3C;

    pub const EMB_PEDO_EN_A: u8 = 0x40;
    pub const EMB_TILT_EN_B: u8 = 0x20;
    pub const EMB_STEP_DET_EN_B: u8 = 0x80;

    /// Debounce step count field, lowest useful setting
    pub const PEDO_DEB_STEPS: u8 = 0x02;

    pub const MD1_INT1_STEP_DET: u8 = 0x08;
    pub const MD2_INT2_TILT: u8 = 0x02;

    /// Output data rate field of `CTRL1_XL`
    pub const CTRL1_XL_ODR_MASK: u8 = 0xF0;
    pub const ODR_XL_26_HZ: u8 = 0x20;
    pub const ODR_XL_104_HZ: u8 = 0x40;

    /// Smallest wake-up threshold
    pub const WAKE_UP_THS_TILT: u8 = 0x04;
}

/// Interval between identity probes during bring-up
const PROBE_INTERVAL_MS: u32 = 10;
/// Interval between reset completion polls
const RESET_POLL_MS: u32 = 5;
/// Give up waiting for the reset bit after this long
const RESET_TIMEOUT_MS: u32 = 200;

/// LSM6DS3 driver
pub struct Lsm6ds3<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Lsm6ds3<I2C> {
    /// Create a driver at the default address
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, I2C_ADDRESS)
    }

    /// Create a driver at another address (SA0 tied high)
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Give the bus handle back
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Bring the sensor up with pedometer and tilt detection running
    ///
    /// Returns the step counter value right after enabling the
    /// pedometer, which is the baseline for the step accumulator.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D, timeout_ms: u32) -> Result<u16, SensorError> {
        self.wait_for_device(delay, timeout_ms)?;
        self.soft_reset(delay)?;
        let steps = self.enable_pedometer()?;
        self.enable_tilt()?;
        Ok(steps)
    }

    /// Read the identity register
    pub fn who_am_i(&mut self) -> Result<u8, SensorError> {
        self.read_reg(reg::WHO_AM_I)
    }

    /// Probe the identity register until it matches or `timeout_ms` passes
    ///
    /// The sensor needs a few milliseconds after power up before it
    /// answers on the bus.
    pub fn wait_for_device<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> Result<(), SensorError> {
        let mut last = Err(SensorError::Bus);
        let mut waited = 0;
        while waited < timeout_ms {
            last = self.who_am_i();
            if last == Ok(DEVICE_ID) {
                return Ok(());
            }
            delay.delay_ms(PROBE_INTERVAL_MS);
            waited += PROBE_INTERVAL_MS;
        }
        match last {
            Ok(id) => Err(SensorError::WrongDevice(id)),
            Err(e) => Err(e),
        }
    }

    /// Software reset, then enable block data update and auto increment
    ///
    /// A reset bit that never clears is not an error; the configuration
    /// write that follows simply lands on whatever state the chip is in.
    pub fn soft_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), SensorError> {
        self.write_reg(reg::CTRL3_C, bits::CTRL3_C_SW_RESET)?;

        let mut waited = 0;
        while waited < RESET_TIMEOUT_MS {
            if self.read_reg(reg::CTRL3_C)? & bits::CTRL3_C_SW_RESET == 0 {
                break;
            }
            delay.delay_ms(RESET_POLL_MS);
            waited += RESET_POLL_MS;
        }

        self.write_reg(reg::CTRL3_C, bits::CTRL3_C_BDU | bits::CTRL3_C_IF_INC)
    }

    /// Enable the hardware pedometer with the step interrupt on INT1
    ///
    /// Leaves the accelerometer at 104 Hz. Returns the current counter.
    pub fn enable_pedometer(&mut self) -> Result<u16, SensorError> {
        self.write_reg(reg::CTRL1_XL, bits::ODR_XL_104_HZ)?;

        self.write_reg(reg::FUNC_CFG_ACCESS, bits::FUNC_CFG_EN)?;
        self.set_bits(reg::EMB_FUNC_EN_A, bits::EMB_PEDO_EN_A)?;
        self.set_bits(reg::EMB_FUNC_EN_B, bits::EMB_STEP_DET_EN_B)?;
        self.write_reg(reg::FUNC_CFG_ACCESS, 0x00)?;

        self.write_reg(reg::CTRL10_C, bits::CTRL10_C_AXES_FUNC)?;

        self.write_reg(reg::FUNC_CFG_ACCESS, bits::FUNC_CFG_EN)?;
        self.set_bits(reg::PEDO_DEB_REG, bits::PEDO_DEB_STEPS)?;
        self.write_reg(reg::FUNC_CFG_ACCESS, 0x00)?;

        self.write_reg(reg::MD1_CFG, bits::MD1_INT1_STEP_DET)?;
        // Drop anything latched during configuration
        self.read_reg(reg::FUNC_SRC)?;

        self.step_count()
    }

    /// Enable tilt detection with its interrupt on INT2
    pub fn enable_tilt(&mut self) -> Result<(), SensorError> {
        self.write_reg(reg::FUNC_CFG_ACCESS, bits::FUNC_CFG_EN)?;
        self.set_bits(reg::EMB_FUNC_EN_B, bits::EMB_TILT_EN_B)?;
        self.write_reg(reg::FUNC_CFG_ACCESS, 0x00)?;

        self.write_reg(reg::WAKE_UP_THS, bits::WAKE_UP_THS_TILT)?;
        self.write_reg(reg::WAKE_UP_DUR, 0x00)?;
        self.write_reg(reg::MD2_CFG, bits::MD2_INT2_TILT)?;

        self.acknowledge_tilt()
    }

    /// Replace the accelerometer data rate, keeping full scale and filter bits
    pub fn set_accel_odr(&mut self, odr: u8) -> Result<(), SensorError> {
        let value = self.read_reg(reg::CTRL1_XL)?;
        let value = (value & !bits::CTRL1_XL_ODR_MASK) | (odr & bits::CTRL1_XL_ODR_MASK);
        self.write_reg(reg::CTRL1_XL, value)
    }

    fn read_reg(&mut self, register: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|_| SensorError::Bus)
    }

    fn set_bits(&mut self, register: u8, mask: u8) -> Result<(), SensorError> {
        let value = self.read_reg(register)?;
        self.write_reg(register, value | mask)
    }
}

impl<I2C: I2c> MotionSensor for Lsm6ds3<I2C> {
    fn step_count(&mut self) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg::STEP_COUNTER_L], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn acknowledge_step(&mut self) -> Result<(), SensorError> {
        self.read_reg(reg::FUNC_SRC).map(|_| ())
    }

    fn acknowledge_tilt(&mut self) -> Result<(), SensorError> {
        self.read_reg(reg::TILT_SRC)?;
        self.read_reg(reg::FUNC_SRC).map(|_| ())
    }

    fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), SensorError> {
        let odr = match rate {
            SampleRate::Reduced => bits::ODR_XL_26_HZ,
            SampleRate::Normal => bits::ODR_XL_104_HZ,
        };
        self.set_accel_odr(odr)
    }
}
