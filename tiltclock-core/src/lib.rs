//! Board-agnostic runtime core for the wrist clock
//!
//! This crate contains all application logic that does not depend on a
//! specific board:
//!
//! - Calendar arithmetic and the reset-surviving wall clock
//! - Step counter reconciliation and daily baseline
//! - Display power life-cycle and backlight fade
//! - Wireless time-sync scheduling with back-off
//! - Differential display refresh
//! - The cooperative runtime loop tying them together
//!
//! Interrupt handlers only touch [`state::InterruptFlags`]; everything else
//! is owned by [`runtime::Watch`] and mutated from the main loop.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

mod fmt;

pub mod battery;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod display;
pub mod persist;
pub mod power;
pub mod runtime;
pub mod state;
pub mod stats;
pub mod steps;
pub mod sync;
pub mod traits;

#[cfg(test)]
mod testing;

pub use runtime::{Board, Peripherals, Watch};
