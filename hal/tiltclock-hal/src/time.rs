//! Monotonic time source

/// Millisecond uptime counter
///
/// The counter wraps after roughly 49.7 days; callers compare timestamps
/// with wrapping subtraction.
pub trait Monotonic {
    /// Milliseconds since boot, wrapping at `u32::MAX`
    fn now_ms(&self) -> u32;
}

/// Monotonic backed by the embassy time driver
#[cfg(feature = "embassy-time")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyMonotonic;

#[cfg(feature = "embassy-time")]
impl Monotonic for EmbassyMonotonic {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap
        embassy_time::Instant::now().as_millis() as u32
    }
}
