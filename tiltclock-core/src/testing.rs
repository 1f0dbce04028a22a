//! In-memory doubles for the board traits, shared by the unit tests

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::boxed::Box;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin};
use proptest::strategy::Strategy;
use tiltclock_hal::{
    BacklightPwm, CpuClock, Monotonic, PowerControl, RecordStore, ResetReason, RetainedError,
    RetainedRegion, RetainedSlot, StorageError, StorageKey, SLOT_CAPACITY,
};

use crate::calendar::CalendarTime;
use crate::runtime::{Board, Peripherals};
use crate::state::InterruptFlags;
use crate::sync::{worker, SpawnError, SyncMailbox, SyncWorker};
use crate::traits::{
    Advertisement, Canvas, Color565, DisplayError, FaceData, FuelGauge, Hand, HandSet, InfoData,
    InfoScreen, Ink, MotionSensor, PeerAddress, Point, RadioError, SampleRate, SensorError,
    TimeServiceRadio, WatchFace, MAX_SCAN_RESULTS,
};

/// Valid calendar times; days stop at 28 so every month accepts them
pub fn any_time() -> impl Strategy<Value = CalendarTime> {
    (1970u16..2190, 1u8..=12, 1u8..=28, 0u8..24, 0u8..60, 0u8..60)
        .prop_map(|(y, mo, d, h, mi, s)| CalendarTime::new(y, mo, d, h, mi, s).unwrap())
}

/// Statics for tests that run in parallel
pub fn leak_mailbox() -> &'static SyncMailbox {
    Box::leak(Box::new(SyncMailbox::new()))
}

pub fn leak_flags() -> &'static InterruptFlags {
    Box::leak(Box::new(InterruptFlags::new()))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<u8, Vec<u8>>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl RecordStore for MemoryStore {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let record = self.records.get(&key.as_u8()).ok_or(StorageError::NotFound)?;
        if record.len() > buffer.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..record.len()].copy_from_slice(record);
        Ok(record.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Flash);
        }
        self.records.insert(key.as_u8(), data.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// Retained region whose slots start empty
#[derive(Debug, Default)]
pub struct MemoryRegion {
    slots: BTreeMap<u8, Vec<u8>>,
}

impl MemoryRegion {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RetainedRegion for MemoryRegion {
    fn load(&mut self, slot: RetainedSlot, buffer: &mut [u8]) -> Result<usize, RetainedError> {
        let Some(bytes) = self.slots.get(&(slot as u8)) else {
            return Ok(0);
        };
        if bytes.len() > buffer.len() {
            return Err(RetainedError::BufferTooSmall);
        }
        buffer[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    fn store(&mut self, slot: RetainedSlot, data: &[u8]) -> Result<(), RetainedError> {
        if data.len() > SLOT_CAPACITY {
            return Err(RetainedError::TooLarge);
        }
        self.slots.insert(slot as u8, data.to_vec());
        Ok(())
    }
}

/// Pedometer returning readings in order, then repeating the last one
#[derive(Debug, Default)]
pub struct ScriptedMotion {
    readings: Vec<u16>,
    next: usize,
    fail_reads: bool,
    step_acks: u32,
    tilt_acks: u32,
    rate: Option<SampleRate>,
}

impl ScriptedMotion {
    pub fn new(readings: &[u16]) -> Self {
        Self {
            readings: readings.to_vec(),
            ..Self::default()
        }
    }

    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn step_acks(&self) -> u32 {
        self.step_acks
    }

    pub fn tilt_acks(&self) -> u32 {
        self.tilt_acks
    }

    /// Last rate set
    pub fn sample_rate(&self) -> Option<SampleRate> {
        self.rate
    }
}

impl MotionSensor for ScriptedMotion {
    fn step_count(&mut self) -> Result<u16, SensorError> {
        if self.fail_reads {
            return Err(SensorError::Bus);
        }
        let value = match self.readings.get(self.next) {
            Some(&value) => {
                self.next += 1;
                value
            }
            None => self.readings.last().copied().unwrap_or(0),
        };
        Ok(value)
    }

    fn acknowledge_step(&mut self) -> Result<(), SensorError> {
        self.step_acks += 1;
        Ok(())
    }

    fn acknowledge_tilt(&mut self) -> Result<(), SensorError> {
        self.tilt_acks += 1;
        Ok(())
    }

    fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), SensorError> {
        self.rate = Some(rate);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeGauge {
    raw: u16,
    millivolts: u16,
    fail: bool,
}

impl FakeGauge {
    pub fn new(raw: u16, millivolts: u16) -> Self {
        Self {
            raw,
            millivolts,
            fail: false,
        }
    }

    pub fn set(&mut self, raw: u16, millivolts: u16) {
        self.raw = raw;
        self.millivolts = millivolts;
    }

    pub fn fail(&mut self, fail: bool) {
        self.fail = fail;
    }
}

impl FuelGauge for FakeGauge {
    fn state_of_charge_raw(&mut self) -> Result<u16, SensorError> {
        if self.fail {
            return Err(SensorError::Bus);
        }
        Ok(self.raw)
    }

    fn cell_voltage_mv(&mut self) -> Result<u16, SensorError> {
        if self.fail {
            return Err(SensorError::Bus);
        }
        Ok(self.millivolts)
    }
}

#[derive(Debug, Default)]
pub struct RecordingPwm {
    duties: Vec<u8>,
    attached: bool,
}

impl RecordingPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_duty(&self) -> Option<u8> {
        self.duties.last().copied()
    }

    pub fn attached(&self) -> bool {
        self.attached
    }
}

impl BacklightPwm for RecordingPwm {
    fn set_duty(&mut self, duty: u8) {
        self.duties.push(duty);
    }

    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
    }
}

/// Uptime shared between the test and the board doubles
#[derive(Debug, Clone, Default)]
pub struct TestClock(Rc<Cell<u32>>);

impl TestClock {
    pub fn new(now_ms: u32) -> Self {
        Self(Rc::new(Cell::new(now_ms)))
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    pub fn set(&self, now_ms: u32) {
        self.0.set(now_ms);
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Monotonic for TestClock {
    fn now_ms(&self) -> u32 {
        self.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerOp {
    ArmTiltWake,
    ReleaseBus,
    DelayMs(u32),
    Rail(bool),
    Cpu(CpuClock),
    LightSleep,
    RestoreBus,
}

/// Power control that records calls; light sleep moves the clock on
#[derive(Debug)]
pub struct MockPower {
    clock: TestClock,
    sleep_ms: u32,
    reason: ResetReason,
    ops: Vec<PowerOp>,
}

impl MockPower {
    pub fn new(clock: TestClock, sleep_ms: u32) -> Self {
        Self {
            clock,
            sleep_ms,
            reason: ResetReason::PowerOn,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[PowerOp] {
        &self.ops
    }
}

impl DelayNs for MockPower {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.ops.push(PowerOp::DelayMs(ms));
    }
}

impl PowerControl for MockPower {
    fn reset_reason(&mut self) -> ResetReason {
        self.reason
    }

    fn set_cpu_clock(&mut self, clock: CpuClock) {
        self.ops.push(PowerOp::Cpu(clock));
    }

    fn set_display_rail(&mut self, on: bool) {
        self.ops.push(PowerOp::Rail(on));
    }

    fn release_display_bus(&mut self) {
        self.ops.push(PowerOp::ReleaseBus);
    }

    fn restore_display_bus(&mut self) {
        self.ops.push(PowerOp::RestoreBus);
    }

    fn arm_tilt_wake(&mut self) {
        self.ops.push(PowerOp::ArmTiltWake);
    }

    fn light_sleep(&mut self) {
        self.ops.push(PowerOp::LightSleep);
        self.clock.advance(self.sleep_ms);
    }
}

/// Active-low button whose level the test controls
#[derive(Debug, Clone, Default)]
pub struct TestButton(Rc<Cell<bool>>);

impl TestButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.0.set(true);
    }

    pub fn release(&self) {
        self.0.set(false);
    }
}

impl ErrorType for TestButton {
    type Error = Infallible;
}

impl InputPin for TestButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasOp {
    Fill(Color565),
    Rect(Point, i16, i16, Color565),
    Line(Point, Point, Color565),
    Triangle(Point, Point, Point, Color565),
    Circle(Point, i16, Color565),
    Text(Point, String, u8),
}

/// Canvas that records primitives instead of rasterising them
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<CanvasOp>,
    rotation: u8,
    on: bool,
    reinits: u32,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn reinits(&self) -> u32 {
        self.reinits
    }
}

impl Canvas for RecordingCanvas {
    fn fill_screen(&mut self, color: Color565) -> Result<(), DisplayError> {
        self.ops.push(CanvasOp::Fill(color));
        Ok(())
    }

    fn fill_rect(
        &mut self,
        origin: Point,
        width: i16,
        height: i16,
        color: Color565,
    ) -> Result<(), DisplayError> {
        self.ops.push(CanvasOp::Rect(origin, width, height, color));
        Ok(())
    }

    fn draw_rect(
        &mut self,
        origin: Point,
        width: i16,
        height: i16,
        color: Color565,
    ) -> Result<(), DisplayError> {
        self.ops.push(CanvasOp::Rect(origin, width, height, color));
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color565) -> Result<(), DisplayError> {
        self.ops.push(CanvasOp::Line(from, to, color));
        Ok(())
    }

    fn fill_triangle(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        color: Color565,
    ) -> Result<(), DisplayError> {
        self.ops.push(CanvasOp::Triangle(a, b, c, color));
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: i16,
        color: Color565,
    ) -> Result<(), DisplayError> {
        self.ops.push(CanvasOp::Circle(center, radius, color));
        Ok(())
    }

    fn rotation(&self) -> u8 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: u8) {
        self.rotation = rotation % 4;
    }

    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        _foreground: Color565,
        _background: Color565,
        size: u8,
    ) -> Result<(), DisplayError> {
        self.ops.push(CanvasOp::Text(origin, String::from(text), size));
        Ok(())
    }

    fn width(&self) -> i16 {
        240
    }

    fn height(&self) -> i16 {
        240
    }

    fn display_on(&mut self) -> Result<(), DisplayError> {
        self.on = true;
        Ok(())
    }

    fn display_off(&mut self) -> Result<(), DisplayError> {
        self.on = false;
        Ok(())
    }

    fn reinit(&mut self) -> Result<(), DisplayError> {
        self.reinits += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceOp {
    Clear,
    Overlays(FaceData),
    Hand(Hand, Point, Ink),
    Hub(Ink),
}

/// Face with trivial geometry that logs what the scheduler asked for
///
/// Hour endpoint x is the hour index (0-59), minute and second x are
/// their values; y tells the hands apart.
#[derive(Debug, Default)]
pub struct StubFace {
    ops: RefCell<Vec<FaceOp>>,
    fail: Cell<bool>,
}

impl StubFace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_ops(&self) -> Vec<FaceOp> {
        core::mem::take(&mut *self.ops.borrow_mut())
    }

    pub fn fail_draws(&self, fail: bool) {
        self.fail.set(fail);
    }

    fn log(&self, op: FaceOp) -> Result<(), DisplayError> {
        if self.fail.get() {
            return Err(DisplayError::Bus);
        }
        self.ops.borrow_mut().push(op);
        Ok(())
    }
}

impl WatchFace for StubFace {
    fn hands(&self, time: &CalendarTime) -> HandSet {
        let hour_index = (time.hour() % 12) * 5 + time.minute() / 12;
        HandSet {
            hour: Point::new(i16::from(hour_index), 0),
            minute: Point::new(i16::from(time.minute()), 1),
            second: Point::new(i16::from(time.second()), 2),
            second_tail: Point::new(i16::from(time.second()), 3),
        }
    }

    fn clear<C: Canvas>(&self, _canvas: &mut C) -> Result<(), DisplayError> {
        self.log(FaceOp::Clear)
    }

    fn draw_overlays<C: Canvas>(
        &self,
        _canvas: &mut C,
        data: &FaceData,
    ) -> Result<(), DisplayError> {
        self.log(FaceOp::Overlays(*data))
    }

    fn draw_hand<C: Canvas>(
        &self,
        _canvas: &mut C,
        hand: Hand,
        end: Point,
        ink: Ink,
    ) -> Result<(), DisplayError> {
        self.log(FaceOp::Hand(hand, end, ink))
    }

    fn draw_hub<C: Canvas>(&self, _canvas: &mut C, ink: Ink) -> Result<(), DisplayError> {
        self.log(FaceOp::Hub(ink))
    }
}

#[derive(Debug, Default)]
pub struct StubInfo {
    draws: Cell<u32>,
}

impl StubInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> u32 {
        self.draws.get()
    }
}

impl InfoScreen for StubInfo {
    fn draw<C: Canvas>(&self, _canvas: &mut C, _data: &InfoData<'_>) -> Result<(), DisplayError> {
        self.draws.set(self.draws.get() + 1);
        Ok(())
    }
}

/// What a scripted peer does when the worker talks to it
#[derive(Debug, Clone, Copy)]
pub enum PeerScript {
    /// Serve this Current Time value
    Time([u8; 10]),
    /// Serve arbitrary characteristic bytes
    Raw(&'static [u8]),
    ConnectFails,
}

fn advert(id: u8, service: u16) -> Advertisement {
    let uuid = service.to_le_bytes();
    let mut adv = Advertisement {
        address: PeerAddress {
            bytes: [id, 0, 0, 0, 0, 0],
            random: false,
        },
        ..Advertisement::default()
    };
    adv.data
        .extend_from_slice(&[0x02, 0x01, 0x06, 0x03, 0x03, uuid[0], uuid[1]])
        .unwrap();
    adv
}

/// Advertisement listing the Current Time Service
pub fn cts_advert(id: u8) -> Advertisement {
    advert(id, 0x1805)
}

/// Advertisement listing only the Battery Service
pub fn other_advert(id: u8) -> Advertisement {
    advert(id, 0x180F)
}

/// Radio that reports a fixed set of peers
#[derive(Debug, Default)]
pub struct ScriptedRadio {
    peers: Vec<(Advertisement, PeerScript)>,
    connected: Option<usize>,
    connects: Vec<u8>,
    disconnects: u32,
    scan_window: Option<u32>,
    fail_scan: bool,
}

impl ScriptedRadio {
    pub fn new(peers: &[(Advertisement, PeerScript)]) -> Self {
        Self {
            peers: peers.to_vec(),
            ..Self::default()
        }
    }

    pub fn fail_scan(&mut self, fail: bool) {
        self.fail_scan = fail;
    }

    /// Ids of the peers connected to, in order
    pub fn connects(&self) -> &[u8] {
        &self.connects
    }

    pub fn disconnects(&self) -> u32 {
        self.disconnects
    }

    pub fn scan_window(&self) -> Option<u32> {
        self.scan_window
    }
}

impl TimeServiceRadio for ScriptedRadio {
    fn scan(
        &mut self,
        window_s: u32,
        results: &mut heapless::Vec<Advertisement, MAX_SCAN_RESULTS>,
    ) -> Result<(), RadioError> {
        self.scan_window = Some(window_s);
        if self.fail_scan {
            return Err(RadioError::Scan);
        }
        for (adv, _) in &self.peers {
            let _ = results.push(adv.clone());
        }
        Ok(())
    }

    fn connect(&mut self, peer: &PeerAddress) -> Result<(), RadioError> {
        let index = self
            .peers
            .iter()
            .position(|(adv, _)| adv.address == *peer)
            .ok_or(RadioError::Connect)?;
        self.connects.push(peer.bytes[0]);
        if let PeerScript::ConnectFails = self.peers[index].1 {
            return Err(RadioError::Connect);
        }
        self.connected = Some(index);
        Ok(())
    }

    fn read_characteristic(
        &mut self,
        service: u16,
        characteristic: u16,
        buf: &mut [u8],
    ) -> Result<usize, RadioError> {
        let index = self.connected.ok_or(RadioError::Read)?;
        if service != 0x1805 {
            return Err(RadioError::ServiceMissing);
        }
        if characteristic != 0x2A2B {
            return Err(RadioError::CharacteristicMissing);
        }
        let bytes: &[u8] = match &self.peers[index].1 {
            PeerScript::Time(payload) => payload,
            PeerScript::Raw(raw) => raw,
            PeerScript::ConnectFails => return Err(RadioError::Read),
        };
        let len = bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }

    fn disconnect(&mut self) {
        if self.connected.take().is_some() {
            self.disconnects += 1;
        }
    }
}

/// Worker that records spawns; the test completes the mailbox itself
#[derive(Debug, Default)]
pub struct DeferredWorker {
    spawns: u32,
    fail: bool,
}

impl DeferredWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful spawns
    pub fn spawns(&self) -> u32 {
        self.spawns
    }

    pub fn fail_spawn(&mut self, fail: bool) {
        self.fail = fail;
    }
}

impl SyncWorker for DeferredWorker {
    fn spawn(
        &mut self,
        _mailbox: &'static SyncMailbox,
        _scan_window_s: u32,
    ) -> Result<(), SpawnError> {
        if self.fail {
            return Err(SpawnError);
        }
        self.spawns += 1;
        Ok(())
    }
}

/// Worker that runs the attempt to completion inside `spawn`
#[derive(Debug)]
pub struct InlineWorker {
    radio: ScriptedRadio,
}

impl SyncWorker for InlineWorker {
    fn spawn(
        &mut self,
        mailbox: &'static SyncMailbox,
        scan_window_s: u32,
    ) -> Result<(), SpawnError> {
        worker::run(&mut self.radio, mailbox, scan_window_s);
        Ok(())
    }
}

/// Board made of the doubles above
pub struct TestBoard;

impl Board for TestBoard {
    type Store = MemoryStore;
    type Region = MemoryRegion;
    type Power = MockPower;
    type Pwm = RecordingPwm;
    type Clock = TestClock;
    type Button = TestButton;
    type Motion = ScriptedMotion;
    type Gauge = FakeGauge;
    type Canvas = RecordingCanvas;
    type Face = StubFace;
    type Info = StubInfo;
    type Worker = InlineWorker;
}

impl TestBoard {
    /// Light sleep lasts 60 s; the gauge reads 87 % at 3987 mV
    pub fn peripherals(
        clock: &TestClock,
        button: &TestButton,
        region: MemoryRegion,
        motion: ScriptedMotion,
        radio: ScriptedRadio,
    ) -> Peripherals<TestBoard> {
        Peripherals {
            store: MemoryStore::new(),
            region,
            power: MockPower::new(clock.clone(), 60_000),
            backlight: RecordingPwm::new(),
            clock: clock.clone(),
            button: button.clone(),
            motion,
            gauge: FakeGauge::new(87 * 256, 3_987),
            canvas: RecordingCanvas::new(),
            face: StubFace::new(),
            info: StubInfo::new(),
            sync_worker: InlineWorker { radio },
        }
    }
}
