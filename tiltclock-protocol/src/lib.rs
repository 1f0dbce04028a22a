//! Wireless time sync protocol pieces
//!
//! The watch reads wall-clock time from a phone that exposes the standard
//! Bluetooth Current Time Service. This crate holds the parts of that
//! exchange that are pure data handling:
//!
//! - Decoding and encoding the Current Time characteristic value
//! - Walking advertising data to find devices listing the service
//!
//! # Current Time layout
//!
//! ```text
//! ┌──────────┬───────┬─────┬───────┬────────┬────────┬─────┬────────────┬────────┐
//! │ YEAR LE  │ MONTH │ DAY │ HOURS │ MINUTES│ SECONDS│ DOW │ FRACTIONS  │ REASON │
//! │ 2B       │ 1B    │ 1B  │ 1B    │ 1B     │ 1B     │ 1B  │ 1B         │ 1B     │
//! └──────────┴───────┴─────┴───────┴────────┴────────┴─────┴────────────┴────────┘
//! ```
//!
//! Only the first seven bytes are required; peers that truncate the value
//! after the seconds field are accepted.

#![no_std]
#![deny(unsafe_code)]

pub mod advertising;
pub mod cts;

pub use advertising::{advertises_service16, AdStructure, AdStructures};
pub use cts::{
    CtsError, CurrentTime, CTS_SERVICE_UUID, CURRENT_TIME_CHAR_UUID, FULL_PAYLOAD_LEN,
};
