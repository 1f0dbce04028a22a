//! Button debouncing
//!
//! The level must hold for longer than the settle time after the last raw
//! edge before it is accepted. Only the released to pressed transition is
//! reported.

/// Debounced push button
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Raw level seen on the previous update
    last_raw: bool,
    /// Accepted level
    stable: bool,
    /// Uptime of the last raw edge
    last_change_ms: u32,
    settle_ms: u32,
}

impl Debouncer {
    /// Start in the released state
    pub fn new(settle_ms: u32, now_ms: u32) -> Self {
        Self {
            last_raw: false,
            stable: false,
            last_change_ms: now_ms,
            settle_ms,
        }
    }

    /// Feed the raw level; returns true on a debounced press
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> bool {
        if pressed != self.last_raw {
            self.last_raw = pressed;
            self.last_change_ms = now_ms;
        }

        if now_ms.wrapping_sub(self.last_change_ms) <= self.settle_ms {
            return false;
        }

        if self.last_raw != self.stable {
            self.stable = self.last_raw;
            return self.stable;
        }
        false
    }

    /// Accepted level
    pub fn is_pressed(&self) -> bool {
        self.stable
    }
}
