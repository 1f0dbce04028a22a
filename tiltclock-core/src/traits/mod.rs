//! Hardware abstraction traits
//!
//! These traits define the interface between the runtime logic and the
//! panel, watchface, sensor and radio implementations.

pub mod canvas;
pub mod face;
pub mod radio;
pub mod sensor;

pub use canvas::{Canvas, Color565, DisplayError, Point};
pub use face::{FaceData, Hand, HandSet, InfoData, InfoScreen, Ink, WatchFace};
pub use radio::{Advertisement, PeerAddress, RadioError, TimeServiceRadio, MAX_SCAN_RESULTS};
pub use sensor::{FuelGauge, MotionSensor, SampleRate, SensorError};
