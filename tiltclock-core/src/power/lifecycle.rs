//! Power life-cycle state machine

/// Display power phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerPhase {
    /// Display on, normal refresh
    #[default]
    Active,
    /// Backlight ramping down before the panel turns off
    FadingOut,
    /// Panel off, waiting for the loop to enter sleep
    PanelOff,
    /// Device in light sleep until the tilt line fires
    Asleep,
    /// Panel back on, backlight ramping up
    WakingFadingIn,
}

/// Events that move the power life-cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerEvent {
    /// Display expiry passed with no sleep pending
    DisplayExpired,
    /// Backlight fade reached its target
    FadeComplete,
    /// Sleep primitive entered
    SleepEntered,
    /// Sleep primitive returned
    WokeUp,
}

impl PowerPhase {
    /// Whether the panel is powered and showing content
    pub fn display_on(&self) -> bool {
        matches!(
            self,
            PowerPhase::Active | PowerPhase::FadingOut | PowerPhase::WakingFadingIn
        )
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: PowerEvent) -> Self {
        use PowerEvent::*;
        use PowerPhase::*;

        match (self, event) {
            (Active, DisplayExpired) => FadingOut,
            // Expiry during the fade-in starts the next fade-out
            (WakingFadingIn, DisplayExpired) => FadingOut,

            (FadingOut, FadeComplete) => PanelOff,
            (PanelOff, SleepEntered) => Asleep,
            (Asleep, WokeUp) => WakingFadingIn,
            (WakingFadingIn, FadeComplete) => Active,

            // Default: stay in current phase
            _ => self,
        }
    }
}
