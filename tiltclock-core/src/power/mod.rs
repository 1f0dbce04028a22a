//! Display power life-cycle
//!
//! Defines when the screen fades out, when the panel is switched off,
//! when the whole device enters light sleep and how it comes back.
//! The life-cycle is an explicit, finite state machine driven from the
//! main loop.

pub mod backlight;
pub mod input;
pub mod lifecycle;
pub mod manager;

pub use backlight::Backlight;
pub use input::Debouncer;
pub use lifecycle::{PowerEvent, PowerPhase};
pub use manager::PowerManager;
