//! Retained (no-init) memory abstractions
//!
//! A retained region is RAM that the startup code does not clear. Its
//! contents survive software resets, watchdog resets and light sleep, but
//! are garbage after a full power loss. The HAL only moves bytes; validity
//! tagging and range checks are the caller's job.

use thiserror::Error;

/// Bytes available to each slot
pub const SLOT_CAPACITY: usize = 64;

/// Fixed slots inside the retained region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RetainedSlot {
    /// Wall-clock time record
    WallClock = 0,
    /// Reset and sync statistics
    SystemStats = 1,
}

/// Errors from retained memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetainedError {
    /// Record larger than the slot
    #[error("record exceeds slot capacity")]
    TooLarge,
    /// Buffer too small for the slot contents
    #[error("buffer too small")]
    BufferTooSmall,
}

/// Byte-level access to the retained region
pub trait RetainedRegion {
    /// Copy the raw slot contents into `buffer`
    ///
    /// Returns the number of bytes copied. The bytes may be anything,
    /// including leftovers from before a power loss.
    fn load(&mut self, slot: RetainedSlot, buffer: &mut [u8]) -> Result<usize, RetainedError>;

    /// Overwrite the slot with `data`
    fn store(&mut self, slot: RetainedSlot, data: &[u8]) -> Result<(), RetainedError>;
}
