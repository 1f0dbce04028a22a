//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tiltclock-core for the sensors on the watch board:
//!
//! - Inertial sensor with pedometer and tilt detection (LSM6DS3)
//! - Battery fuel gauge (MAX17048)

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;

#[cfg(test)]
extern crate std;
