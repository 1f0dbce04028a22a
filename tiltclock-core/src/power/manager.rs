//! Display power manager
//!
//! Owns the life-cycle phase plus the expiry and pending flags, and runs
//! the side effects of each transition. The runtime calls in the fixed
//! loop order; panel off and light sleep always happen on different loop
//! passes.

use tiltclock_hal::{BacklightPwm, CpuClock, PowerControl};

use super::backlight::Backlight;
use super::lifecycle::{PowerEvent, PowerPhase};
use crate::config::WatchConfig;
use crate::fmt::{debug, info, warn};
use crate::state::InterruptFlags;
use crate::traits::{Canvas, MotionSensor, SampleRate};

/// Display power state
#[derive(Debug, Clone)]
pub struct PowerManager {
    phase: PowerPhase,
    /// Uptime after which the display times out
    expires_at_ms: u32,
    /// Fade-out started, sleep follows once the panel is off
    pending_sleep: bool,
    /// Fade-out started, panel not yet switched off
    pending_panel_off: bool,
    display_timeout_ms: u32,
    fade_out_ms: u32,
    fade_in_ms: u32,
    max_duty: u8,
    bus_release_settle_ms: u32,
    panel_power_settle_ms: u32,
}

impl PowerManager {
    /// Display on, expiring one timeout from `now_ms`
    pub fn new(config: &WatchConfig, now_ms: u32) -> Self {
        Self {
            phase: PowerPhase::Active,
            expires_at_ms: now_ms.wrapping_add(config.display_timeout_ms),
            pending_sleep: false,
            pending_panel_off: false,
            display_timeout_ms: config.display_timeout_ms,
            fade_out_ms: config.fade_out_ms,
            fade_in_ms: config.fade_in_ms,
            max_duty: config.max_backlight_duty,
            bus_release_settle_ms: config.bus_release_settle_ms,
            panel_power_settle_ms: config.panel_power_settle_ms,
        }
    }

    pub fn phase(&self) -> PowerPhase {
        self.phase
    }

    pub fn display_on(&self) -> bool {
        self.phase.display_on()
    }

    pub fn pending_sleep(&self) -> bool {
        self.pending_sleep
    }

    pub fn pending_panel_off(&self) -> bool {
        self.pending_panel_off
    }

    pub fn expires_at_ms(&self) -> u32 {
        self.expires_at_ms
    }

    /// Push the expiry one timeout past `now_ms`
    pub fn extend(&mut self, now_ms: u32) {
        self.expires_at_ms = now_ms.wrapping_add(self.display_timeout_ms);
    }

    fn apply(&mut self, event: PowerEvent) {
        let next = self.phase.transition(event);
        if next != self.phase {
            debug!("Power {:?} -> {:?}", self.phase, next);
        }
        self.phase = next;
    }

    /// Handle a pending tilt interrupt
    ///
    /// Acknowledges the sensor, clears the flag and extends the expiry if
    /// the display is on. Returns whether a tilt was pending.
    pub fn service_tilt<M: MotionSensor>(
        &mut self,
        flags: &InterruptFlags,
        sensor: &mut M,
        now_ms: u32,
    ) -> bool {
        if !flags.tilt_raised() {
            return false;
        }
        if let Err(e) = sensor.acknowledge_tilt() {
            debug!("Tilt status read failed: {:?}", e);
        }
        flags.take_tilt();

        if self.display_on() {
            self.extend(now_ms);
        }
        true
    }

    /// Start the fade-out once the display has expired
    ///
    /// Returns true when the fade-out was started on this call.
    pub fn check_timeout<M: MotionSensor, P: BacklightPwm>(
        &mut self,
        now_ms: u32,
        sensor: &mut M,
        backlight: &mut Backlight<P>,
    ) -> bool {
        if self.pending_sleep || !self.display_on() {
            return false;
        }
        // Past the expiry, robust to uptime wrap
        if (now_ms.wrapping_sub(self.expires_at_ms) as i32) <= 0 {
            return false;
        }

        info!("Display timeout, fading out");
        if let Err(e) = sensor.set_sample_rate(SampleRate::Reduced) {
            warn!("Sample rate change failed: {:?}", e);
        }
        backlight.start_fade(0, self.fade_out_ms, now_ms);
        self.pending_sleep = true;
        self.pending_panel_off = true;
        self.apply(PowerEvent::DisplayExpired);
        true
    }

    /// Advance the backlight and finish a wake-up fade
    pub fn update_fade<P: BacklightPwm>(&mut self, backlight: &mut Backlight<P>, now_ms: u32) {
        backlight.update(now_ms);
        if self.phase == PowerPhase::WakingFadingIn && backlight.is_idle() {
            self.apply(PowerEvent::FadeComplete);
        }
    }

    /// Switch the panel off once the fade-out is done
    ///
    /// Returns true when the panel was switched off on this call.
    pub fn complete_panel_off<C: Canvas, P: BacklightPwm>(
        &mut self,
        canvas: &mut C,
        backlight: &Backlight<P>,
    ) -> bool {
        if !self.pending_panel_off || !backlight.is_idle() {
            return false;
        }
        if let Err(e) = canvas.display_off() {
            warn!("Panel off failed: {:?}", e);
        }
        self.pending_panel_off = false;
        self.apply(PowerEvent::FadeComplete);
        true
    }

    /// Whether the loop should enter light sleep now
    pub fn ready_to_sleep<P: BacklightPwm>(&self, backlight: &Backlight<P>) -> bool {
        self.pending_sleep
            && !self.pending_panel_off
            && backlight.is_idle()
            && self.phase == PowerPhase::PanelOff
    }

    /// Power down the display path, light sleep until tilt, power back up
    ///
    /// Returns with the panel re-initialised but still dark; call
    /// [`PowerManager::finish_wake`] to light it.
    pub fn sleep_until_tilt<W, M, C, P>(
        &mut self,
        power: &mut W,
        sensor: &mut M,
        canvas: &mut C,
        backlight: &mut Backlight<P>,
        flags: &InterruptFlags,
    ) where
        W: PowerControl,
        M: MotionSensor,
        C: Canvas,
        P: BacklightPwm,
    {
        power.arm_tilt_wake();
        // A latched tilt would keep the wake line asserted
        if let Err(e) = sensor.acknowledge_tilt() {
            debug!("Tilt status read failed: {:?}", e);
        }

        backlight.prepare_for_sleep();
        power.release_display_bus();
        power.delay_ms(self.bus_release_settle_ms);
        power.set_display_rail(false);
        power.set_cpu_clock(CpuClock::Low);

        self.apply(PowerEvent::SleepEntered);
        info!("Light sleep");
        power.light_sleep();

        power.set_cpu_clock(CpuClock::Normal);
        power.set_display_rail(true);
        power.delay_ms(self.panel_power_settle_ms);
        power.restore_display_bus();
        backlight.restore_after_sleep();
        if let Err(e) = canvas.reinit() {
            warn!("Panel init after sleep failed: {:?}", e);
        }

        if let Err(e) = sensor.acknowledge_tilt() {
            debug!("Tilt status read failed: {:?}", e);
        }
        flags.take_tilt();
        info!("Woke on tilt");
    }

    /// Light the panel after sleep and restart the display timer
    pub fn finish_wake<C: Canvas, M: MotionSensor, P: BacklightPwm>(
        &mut self,
        canvas: &mut C,
        backlight: &mut Backlight<P>,
        sensor: &mut M,
        now_ms: u32,
    ) {
        self.apply(PowerEvent::WokeUp);
        if let Err(e) = canvas.display_on() {
            warn!("Panel on failed: {:?}", e);
        }
        backlight.start_fade(self.max_duty, self.fade_in_ms, now_ms);
        if let Err(e) = sensor.set_sample_rate(SampleRate::Normal) {
            warn!("Sample rate change failed: {:?}", e);
        }
        self.extend(now_ms);
        self.pending_sleep = false;
    }
}
