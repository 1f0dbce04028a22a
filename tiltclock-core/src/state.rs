//! State shared with interrupt context
//!
//! Interrupt handlers may only raise the flags in [`InterruptFlags`]; the
//! main loop is the only reader and the only one that clears them. All
//! other runtime state is owned by the loop.

use portable_atomic::{AtomicBool, Ordering};

/// Edge flags raised by interrupt handlers
///
/// Lives in a `static` so handlers can reach it:
///
/// ```
/// use tiltclock_core::state::InterruptFlags;
///
/// static FLAGS: InterruptFlags = InterruptFlags::new();
///
/// // In the IMU INT1 handler
/// FLAGS.on_step_interrupt();
///
/// // In the main loop
/// assert!(FLAGS.take_step());
/// assert!(!FLAGS.take_step());
/// ```
#[derive(Debug)]
pub struct InterruptFlags {
    tilt: AtomicBool,
    step: AtomicBool,
}

impl InterruptFlags {
    pub const fn new() -> Self {
        Self {
            tilt: AtomicBool::new(false),
            step: AtomicBool::new(false),
        }
    }

    /// Tilt interrupt handler body
    pub fn on_tilt_interrupt(&self) {
        self.tilt.store(true, Ordering::Release);
    }

    /// Step interrupt handler body
    pub fn on_step_interrupt(&self) {
        self.step.store(true, Ordering::Release);
    }

    /// Whether a tilt edge is waiting, without clearing it
    pub fn tilt_raised(&self) -> bool {
        self.tilt.load(Ordering::Acquire)
    }

    /// Whether a step edge is waiting, without clearing it
    pub fn step_raised(&self) -> bool {
        self.step.load(Ordering::Acquire)
    }

    /// Read and clear the tilt flag
    pub fn take_tilt(&self) -> bool {
        self.tilt.swap(false, Ordering::AcqRel)
    }

    /// Read and clear the step flag
    pub fn take_step(&self) -> bool {
        self.step.swap(false, Ordering::AcqRel)
    }
}

impl Default for InterruptFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Screen currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    #[default]
    Watchface,
    Info,
}

impl Screen {
    /// The other screen
    pub fn toggled(self) -> Self {
        match self {
            Screen::Watchface => Screen::Info,
            Screen::Info => Screen::Watchface,
        }
    }
}
