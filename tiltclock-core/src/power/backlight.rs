//! Non-blocking backlight fade
//!
//! A fade is a linear ramp from the duty at the start of the fade to the
//! target. Each [`Backlight::update`] moves the duty to where the ramp
//! should be at that instant, so a slow loop catches up instead of
//! stretching the fade, and the target is written exactly once the
//! duration has elapsed.

use tiltclock_hal::BacklightPwm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ramp {
    from: u8,
    start_ms: u32,
    duration_ms: u32,
}

/// Backlight PWM with fade support
#[derive(Debug)]
pub struct Backlight<P> {
    pwm: P,
    current: u8,
    target: u8,
    ramp: Option<Ramp>,
    /// Duty to restore after sleep
    saved: u8,
}

impl<P: BacklightPwm> Backlight<P> {
    /// Attach the PWM and drive it at `duty`
    pub fn new(mut pwm: P, duty: u8) -> Self {
        pwm.attach();
        pwm.set_duty(duty);
        Self {
            pwm,
            current: duty,
            target: duty,
            ramp: None,
            saved: duty,
        }
    }

    /// Start a ramp to `target` lasting `duration_ms`
    ///
    /// Replaces any running fade, starting from the current duty.
    pub fn start_fade(&mut self, target: u8, duration_ms: u32, now_ms: u32) {
        self.target = target;
        if target == self.current {
            self.ramp = None;
            return;
        }
        self.ramp = Some(Ramp {
            from: self.current,
            start_ms: now_ms,
            duration_ms,
        });
        self.update(now_ms);
    }

    /// Advance the running fade
    pub fn update(&mut self, now_ms: u32) {
        let Some(ramp) = self.ramp else {
            return;
        };

        let elapsed = now_ms.wrapping_sub(ramp.start_ms);
        let duty = if elapsed >= ramp.duration_ms {
            self.target
        } else {
            let from = i32::from(ramp.from);
            let span = i32::from(self.target) - from;
            // elapsed < duration_ms, so the quotient stays within span
            let progress = (i64::from(span) * i64::from(elapsed)) / i64::from(ramp.duration_ms);
            (from + progress as i32) as u8
        };

        if duty != self.current {
            self.current = duty;
            self.pwm.set_duty(duty);
        }
        if self.current == self.target {
            self.ramp = None;
        }
    }

    /// True once the duty equals the target
    pub fn is_idle(&self) -> bool {
        self.ramp.is_none() || self.current == self.target
    }

    /// Duty currently driven
    pub fn duty(&self) -> u8 {
        self.current
    }

    /// Duty the running or last fade aims for
    pub fn target(&self) -> u8 {
        self.target
    }

    /// Drive the pin low and release the PWM peripheral
    pub fn prepare_for_sleep(&mut self) {
        self.saved = self.current;
        self.ramp = None;
        self.pwm.set_duty(0);
        self.pwm.detach();
    }

    /// Reattach the PWM at the duty it had before sleep
    pub fn restore_after_sleep(&mut self) {
        self.pwm.attach();
        self.current = self.saved;
        self.target = self.saved;
        self.pwm.set_duty(self.saved);
    }

    #[cfg(test)]
    pub(crate) fn pwm(&self) -> &P {
        &self.pwm
    }
}
