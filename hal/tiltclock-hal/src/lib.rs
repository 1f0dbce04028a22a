//! Tiltclock Hardware Abstraction Layer
//!
//! This crate defines the platform traits the runtime core consumes. A
//! board crate implements them on top of its chip HAL so the same core
//! runs on any microcontroller with a retained RAM region, a backlight
//! PWM channel and a light-sleep mode with an external wake source.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tiltclock-core (runtime loop)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tiltclock-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  board crate (chip specific)            │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::RecordStore`] - Wear-levelled keyed records in flash
//! - [`retained::RetainedRegion`] - Memory that survives soft resets
//! - [`power::PowerControl`] - Clocks, display rail, bus pins, light sleep
//! - [`pwm::BacklightPwm`] - Backlight duty output
//! - [`time::Monotonic`] - Millisecond uptime counter

#![no_std]
#![deny(unsafe_code)]

pub mod power;
pub mod pwm;
pub mod retained;
pub mod storage;
pub mod time;

// Re-export key traits at crate root for convenience
pub use power::{CpuClock, PowerControl, ResetReason};
pub use pwm::BacklightPwm;
pub use retained::{RetainedError, RetainedRegion, RetainedSlot, SLOT_CAPACITY};
pub use storage::{RecordStore, StorageError, StorageKey};
pub use time::Monotonic;
