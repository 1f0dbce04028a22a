//! Rendering for the Tiltclock round panel
//!
//! This crate provides:
//! - `GraphicsCanvas`, the core `Canvas` trait on top of any
//!   `embedded-graphics` RGB565 draw target, with software rotation
//! - `AnalogFace`, the watchface artwork and hand geometry
//! - `InfoPage`, the statistics page
//!
//! # Architecture
//!
//! The runtime in tiltclock-core decides what to repaint and when; the
//! types here only know how to paint it. Panel power commands (sleep,
//! wake, re-initialisation) stay with the board's panel driver behind
//! `PanelPower`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod canvas;
pub mod face;
pub mod info;
pub mod trig;

#[cfg(test)]
mod testing;

// Re-export key types
pub use canvas::{GraphicsCanvas, NoPanel, PanelPower};
pub use face::AnalogFace;
pub use info::InfoPage;
