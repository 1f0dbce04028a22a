//! Cooperative runtime loop
//!
//! [`Watch`] owns every piece of runtime state and all board peripherals.
//! The board calls [`Watch::initialize`] once after bring-up and then
//! [`Watch::tick`] forever. Each tick services, in order:
//!
//! 1. Time sync (drain finished attempt, start the next one when due)
//! 2. Button
//! 3. Backlight fade
//! 4. Tilt interrupt
//! 5. Step interrupt and step watchdog
//! 6. Battery
//! 7. Display timeout
//! 8. Display refresh
//! 9. Panel off and light sleep

use embedded_hal::digital::InputPin;
use tiltclock_hal::{BacklightPwm, Monotonic, PowerControl, RecordStore, RetainedRegion};

use crate::battery::{BatteryMonitor, BatteryReading};
use crate::calendar::CalendarTime;
use crate::clock::PersistentClock;
use crate::config::WatchConfig;
use crate::display::RefreshScheduler;
use crate::fmt::{debug, info, warn};
use crate::power::{Backlight, Debouncer, PowerManager, PowerPhase};
use crate::state::{InterruptFlags, Screen};
use crate::stats::{StatsLedger, SystemStats};
use crate::steps::StepAccumulator;
use crate::sync::{SyncMailbox, SyncScheduler, SyncWorker};
use crate::traits::{
    Canvas, FaceData, FuelGauge, InfoData, InfoScreen, MotionSensor, SampleRate, WatchFace,
};

/// Peripheral types of a board
pub trait Board {
    type Store: RecordStore;
    type Region: RetainedRegion;
    type Power: PowerControl;
    type Pwm: BacklightPwm;
    type Clock: Monotonic;
    /// Active-low push button
    type Button: InputPin;
    type Motion: MotionSensor;
    type Gauge: FuelGauge;
    type Canvas: Canvas;
    type Face: WatchFace;
    type Info: InfoScreen;
    type Worker: SyncWorker;
}

/// Everything the runtime takes ownership of at start-up
pub struct Peripherals<B: Board> {
    pub store: B::Store,
    pub region: B::Region,
    pub power: B::Power,
    pub backlight: B::Pwm,
    pub clock: B::Clock,
    pub button: B::Button,
    pub motion: B::Motion,
    pub gauge: B::Gauge,
    pub canvas: B::Canvas,
    pub face: B::Face,
    pub info: B::Info,
    pub sync_worker: B::Worker,
}

/// The running watch
pub struct Watch<B: Board> {
    store: B::Store,
    region: B::Region,
    board_power: B::Power,
    uptime: B::Clock,
    button: B::Button,
    motion: B::Motion,
    gauge: B::Gauge,
    canvas: B::Canvas,
    face: B::Face,
    info: B::Info,
    worker: B::Worker,

    flags: &'static InterruptFlags,
    mailbox: &'static SyncMailbox,

    clock: PersistentClock,
    steps: StepAccumulator,
    stats: StatsLedger,
    battery: BatteryMonitor,
    backlight: Backlight<B::Pwm>,
    power: PowerManager,
    debouncer: Debouncer,
    sync: SyncScheduler,
    refresh: RefreshScheduler,
}

impl<B: Board> Watch<B> {
    /// Restore persisted state, light the panel and paint the watchface
    ///
    /// An invalid configuration is replaced by the defaults.
    pub fn initialize(
        peripherals: Peripherals<B>,
        config: WatchConfig,
        flags: &'static InterruptFlags,
        mailbox: &'static SyncMailbox,
    ) -> Self {
        let Peripherals {
            mut store,
            mut region,
            power: mut board_power,
            backlight,
            clock: uptime,
            button,
            mut motion,
            gauge,
            mut canvas,
            face,
            info: info_screen,
            sync_worker,
        } = peripherals;

        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("Invalid configuration ({:?}), using defaults", e);
                WatchConfig::default()
            }
        };

        let now = uptime.now_ms();
        let reason = board_power.reset_reason();
        let stats = StatsLedger::boot(&mut region, reason);
        let (clock, origin) = PersistentClock::initialize(&mut region, now);
        info!("Clock {:?} at {:?}", origin, clock.now());

        let snapshot = motion.step_count().unwrap_or_else(|e| {
            warn!("Initial step read failed: {:?}", e);
            0
        });
        let steps = StepAccumulator::initialize(&mut store, snapshot, now, &config);
        if let Err(e) = motion.set_sample_rate(SampleRate::Normal) {
            warn!("Sample rate change failed: {:?}", e);
        }

        if let Err(e) = canvas.display_on() {
            warn!("Panel on failed: {:?}", e);
        }
        let backlight = Backlight::new(backlight, config.max_backlight_duty);

        let mut sync = SyncScheduler::new(&config, now);
        sync.request_immediate();

        let mut watch = Self {
            store,
            region,
            board_power,
            uptime,
            button,
            motion,
            gauge,
            canvas,
            face,
            info: info_screen,
            worker: sync_worker,
            flags,
            mailbox,
            clock,
            steps,
            stats,
            battery: BatteryMonitor::new(config.battery_poll_ms),
            backlight,
            power: PowerManager::new(&config, now),
            debouncer: Debouncer::new(config.button_settle_ms, now),
            sync,
            refresh: RefreshScheduler::new(),
        };
        watch.repaint_now();
        watch
    }

    /// One pass of the main loop
    pub fn tick(&mut self) {
        let now = self.uptime.now_ms();

        self.service_sync(now);
        self.service_button(now);
        self.power.update_fade(&mut self.backlight, now);
        self.power.service_tilt(self.flags, &mut self.motion, now);
        self.steps
            .service_interrupt(self.flags, &mut self.motion, &mut self.store, now);
        self.steps
            .poll_watchdog(&mut self.motion, &mut self.store, now);
        self.battery.poll(&mut self.gauge, now);
        self.power
            .check_timeout(now, &mut self.motion, &mut self.backlight);
        self.refresh_display(now);
        self.service_sleep();
    }

    /// Ask for a sync attempt on the next tick
    pub fn request_sync(&mut self) {
        self.sync.request_immediate();
    }

    /// Current wall-clock time
    pub fn time(&self) -> CalendarTime {
        self.clock.now()
    }

    pub fn steps_today(&self) -> u32 {
        self.steps.today()
    }

    pub fn stats(&self) -> &SystemStats {
        self.stats.stats()
    }

    pub fn battery(&self) -> BatteryReading {
        self.battery.reading()
    }

    pub fn screen(&self) -> Screen {
        self.refresh.screen()
    }

    pub fn power_phase(&self) -> PowerPhase {
        self.power.phase()
    }

    pub fn display_on(&self) -> bool {
        self.power.display_on()
    }

    fn service_sync(&mut self, now: u32) {
        let Some(outcome) = self.sync.service(now, self.mailbox, &mut self.worker) else {
            return;
        };
        match outcome {
            Ok(time) => {
                self.clock.set_time(&mut self.region, time, now);
                self.stats.record_sync_success(&mut self.region, time);
            }
            Err(_) => self.stats.record_sync_failure(&mut self.region),
        }
    }

    fn service_button(&mut self, now: u32) {
        // Active low; a failed read counts as released
        let level = self.button.is_low().unwrap_or(false);
        if !self.debouncer.update(level, now) {
            return;
        }

        self.power.extend(now);
        if !self.power.display_on() {
            return;
        }
        debug!("Button: switching screen");
        let data = self.face_data();
        if let Err(e) = self
            .refresh
            .switch_screen(&mut self.canvas, &self.face, &data)
        {
            warn!("Screen switch draw failed: {:?}", e);
        }
    }

    fn face_data(&self) -> FaceData {
        FaceData {
            time: self.clock.now(),
            steps_today: self.steps.today(),
            battery_percent: self.battery.percent(),
        }
    }

    /// Catch the clock up; returns whether a second elapsed
    fn advance_clock(&mut self, now: u32) -> bool {
        let advance = self.clock.advance(&mut self.region, now);
        if advance.day_rollovers > 0 {
            self.steps.reset_daily_baseline(&mut self.store, now);
        }
        advance.seconds > 0
    }

    fn refresh_display(&mut self, now: u32) {
        let second_elapsed = self.advance_clock(now);
        if !self.power.display_on() {
            return;
        }

        let result = match self.refresh.screen() {
            Screen::Watchface if second_elapsed => {
                let data = self.face_data();
                self.refresh
                    .tick_watchface(&mut self.canvas, &self.face, &data)
            }
            Screen::Watchface => Ok(()),
            Screen::Info => {
                let data = InfoData {
                    stats: self.stats.stats(),
                    now: self.clock.now(),
                    battery: self.battery.reading(),
                };
                self.refresh
                    .tick_info(&mut self.canvas, &self.info, &data, self.stats.version())
                    .map(|_| ())
            }
        };
        if let Err(e) = result {
            warn!("Display refresh failed: {:?}", e);
        }
    }

    /// Repaint the active screen from scratch
    fn repaint_now(&mut self) {
        self.refresh.invalidate();
        let result = match self.refresh.screen() {
            Screen::Watchface => {
                let data = self.face_data();
                self.refresh
                    .full_repaint(&mut self.canvas, &self.face, &data)
            }
            Screen::Info => {
                let data = InfoData {
                    stats: self.stats.stats(),
                    now: self.clock.now(),
                    battery: self.battery.reading(),
                };
                self.refresh
                    .tick_info(&mut self.canvas, &self.info, &data, self.stats.version())
                    .map(|_| ())
            }
        };
        if let Err(e) = result {
            warn!("Repaint failed: {:?}", e);
        }
    }

    fn service_sleep(&mut self) {
        if self
            .power
            .complete_panel_off(&mut self.canvas, &self.backlight)
        {
            // Sleep on a later pass
            return;
        }
        if !self.power.ready_to_sleep(&self.backlight) {
            return;
        }

        self.power.sleep_until_tilt(
            &mut self.board_power,
            &mut self.motion,
            &mut self.canvas,
            &mut self.backlight,
            self.flags,
        );

        let now = self.uptime.now_ms();
        self.power
            .finish_wake(&mut self.canvas, &mut self.backlight, &mut self.motion, now);
        self.advance_clock(now);
        self.stats.record_screen_wake(&mut self.region);
        self.repaint_now();
    }

    #[cfg(test)]
    pub(crate) fn canvas(&self) -> &B::Canvas {
        &self.canvas
    }

    #[cfg(test)]
    pub(crate) fn backlight_duty(&self) -> u8 {
        self.backlight.duty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        cts_advert, leak_flags, leak_mailbox, MemoryRegion, PeerScript, ScriptedMotion,
        ScriptedRadio, TestBoard, TestButton, TestClock,
    };
    use tiltclock_protocol::CurrentTime;

    struct Rig {
        clock: TestClock,
        button: TestButton,
        flags: &'static InterruptFlags,
        watch: Watch<TestBoard>,
    }

    impl Rig {
        fn new(region: MemoryRegion, motion: ScriptedMotion, radio: ScriptedRadio) -> Self {
            let clock = TestClock::new(0);
            let button = TestButton::new();
            let flags = leak_flags();
            let peripherals = TestBoard::peripherals(&clock, &button, region, motion, radio);
            let watch = Watch::initialize(peripherals, WatchConfig::default(), flags, leak_mailbox());
            Self {
                clock,
                button,
                flags,
                watch,
            }
        }

        fn tick_at(&mut self, now: u32) {
            self.clock.set(now);
            self.watch.tick();
        }

        /// Tick every `step` ms from the current time up to `until`
        fn run_until(&mut self, until: u32, step: u32) {
            let mut now = self.clock.get();
            while now < until {
                now = (now + step).min(until);
                self.tick_at(now);
            }
        }
    }

    fn time_server() -> ScriptedRadio {
        let payload = CurrentTime {
            year: 2024,
            month: 6,
            day: 1,
            hours: 10,
            minutes: 15,
            seconds: 30,
            weekday: Some(6),
        }
        .encode();
        ScriptedRadio::new(&[(cts_advert(1), PeerScript::Time(payload))])
    }

    fn at(h: u8, m: u8, s: u8) -> CalendarTime {
        CalendarTime::new(2024, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_boot_falls_back_to_build_time() {
        let rig = Rig::new(
            MemoryRegion::new(),
            ScriptedMotion::new(&[0]),
            ScriptedRadio::new(&[]),
        );
        assert_eq!(rig.watch.time(), crate::calendar::build_time());
        assert_eq!(rig.watch.power_phase(), PowerPhase::Active);
        assert_eq!(rig.watch.stats().hard_resets, 1);
        assert!(rig.watch.canvas().is_on());
    }

    #[test]
    fn test_sync_then_advance() {
        let mut rig = Rig::new(MemoryRegion::new(), ScriptedMotion::new(&[0]), time_server());

        // Worker runs inline on the first tick, outcome applied on the next
        rig.tick_at(0);
        rig.tick_at(1);
        assert_eq!(rig.watch.time(), at(10, 15, 30));
        assert_eq!(rig.watch.time().weekday_name(), "SAT");
        assert_eq!(rig.watch.stats().sync_successes, 1);
        assert_eq!(rig.watch.stats().last_sync, Some(at(10, 15, 30)));

        rig.tick_at(35_001);
        assert_eq!(rig.watch.time(), at(10, 16, 5));
    }

    #[test]
    fn test_failed_sync_counted() {
        let mut rig = Rig::new(
            MemoryRegion::new(),
            ScriptedMotion::new(&[0]),
            ScriptedRadio::new(&[]),
        );
        rig.tick_at(0);
        rig.tick_at(1);
        assert_eq!(rig.watch.stats().sync_failures, 1);
        assert_eq!(rig.watch.stats().sync_successes, 0);
    }

    #[test]
    fn test_timeout_sleep_and_wake() {
        let mut rig = Rig::new(
            MemoryRegion::new(),
            ScriptedMotion::new(&[0]),
            ScriptedRadio::new(&[]),
        );

        rig.run_until(10_000, 100);
        assert_eq!(rig.watch.power_phase(), PowerPhase::Active);

        rig.tick_at(10_001);
        assert_eq!(rig.watch.power_phase(), PowerPhase::FadingOut);

        // Tilt during the fade does not abort it
        rig.flags.on_tilt_interrupt();
        rig.tick_at(10_500);
        assert_eq!(rig.watch.power_phase(), PowerPhase::FadingOut);
        assert!(!rig.flags.tilt_raised());

        rig.tick_at(11_001);
        assert_eq!(rig.watch.power_phase(), PowerPhase::PanelOff);
        assert!(!rig.watch.canvas().is_on());

        // Sleep and wake happen inside this tick; the mock sleeps 60 s
        rig.tick_at(11_002);
        assert_eq!(rig.clock.get(), 71_002);
        assert_eq!(rig.watch.power_phase(), PowerPhase::WakingFadingIn);
        assert!(rig.watch.canvas().is_on());
        assert_eq!(rig.watch.canvas().reinits(), 1);
        assert_eq!(rig.watch.stats().screen_wakes, 1);

        rig.tick_at(71_052);
        assert_eq!(rig.watch.power_phase(), PowerPhase::Active);
        assert_eq!(rig.watch.backlight_duty(), 255);
    }

    #[test]
    fn test_clock_catches_up_after_sleep() {
        let mut region = MemoryRegion::new();
        let (mut clock, _) = PersistentClock::initialize(&mut region, 0);
        clock.set_time(&mut region, at(10, 0, 0), 0);
        let mut rig = Rig::new(region, ScriptedMotion::new(&[0]), ScriptedRadio::new(&[]));

        // Fade starts at 10.5 s, panel off at 11.5 s, sleep at 12 s
        rig.run_until(12_000, 500);
        assert_eq!(rig.clock.get(), 72_000);
        // 12 s awake plus 60 s asleep
        assert_eq!(rig.watch.time(), at(10, 1, 12));
    }

    #[test]
    fn test_button_toggles_screen() {
        let mut rig = Rig::new(
            MemoryRegion::new(),
            ScriptedMotion::new(&[0]),
            ScriptedRadio::new(&[]),
        );
        rig.tick_at(100);

        rig.button.press();
        rig.tick_at(200);
        rig.tick_at(251);
        assert_eq!(rig.watch.screen(), Screen::Info);

        // Press pushed the expiry out
        rig.button.release();
        rig.run_until(10_000, 100);
        assert_eq!(rig.watch.power_phase(), PowerPhase::Active);

        rig.button.press();
        rig.tick_at(10_050);
        rig.tick_at(10_101);
        assert_eq!(rig.watch.screen(), Screen::Watchface);
        assert_eq!(rig.watch.power_phase(), PowerPhase::Active);
    }

    #[test]
    fn test_midnight_resets_daily_steps() {
        let mut region = MemoryRegion::new();
        let (mut clock, _) = PersistentClock::initialize(&mut region, 0);
        clock.set_time(&mut region, at(23, 59, 58), 0);
        let mut rig = Rig::new(region, ScriptedMotion::new(&[100, 250]), ScriptedRadio::new(&[]));

        rig.tick_at(1_000);
        assert_eq!(rig.watch.steps_today(), 150);

        rig.tick_at(2_000);
        assert_eq!(rig.watch.time(), CalendarTime::new(2024, 6, 2, 0, 0, 0).unwrap());
        assert_eq!(rig.watch.steps_today(), 0);
    }

    #[test]
    fn test_battery_polled_on_first_tick() {
        let mut rig = Rig::new(
            MemoryRegion::new(),
            ScriptedMotion::new(&[0]),
            ScriptedRadio::new(&[]),
        );
        rig.tick_at(0);
        assert_eq!(rig.watch.battery().percent, 87);
        assert_eq!(rig.watch.battery().millivolts, 3_987);
    }
}
