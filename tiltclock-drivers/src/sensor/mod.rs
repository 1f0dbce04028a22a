//! Sensor drivers
//!
//! Both chips sit on the same I2C bus; each driver owns its bus handle,
//! so boards share the bus with an `embedded-hal-bus` device wrapper.

pub mod lsm6ds3;
pub mod max17048;

pub use lsm6ds3::Lsm6ds3;
pub use max17048::Max17048;
