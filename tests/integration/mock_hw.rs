//! Mock adapters for integration tests.
//!
//! Every relay write is recorded in a shared log so a test can keep a
//! handle after the relay itself has moved into the service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use firesuppress::adapters::device_id::DeviceIdString;
use firesuppress::app::events::TelemetryRecord;
use firesuppress::app::ports::{ByteSource, Clock, Relay, SensorPort, TelemetrySink};
use firesuppress::app::service::SuppressionService;
use firesuppress::config::SystemConfig;
use firesuppress::sensors::SensorReading;

// ── Relay ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct WriteLog(Arc<Mutex<Vec<bool>>>);

#[allow(dead_code)]
impl WriteLog {
    pub fn writes(&self) -> Vec<bool> {
        self.0.lock().unwrap().clone()
    }

    pub fn energised(&self) -> bool {
        self.writes().last().copied().unwrap_or(false)
    }

    /// Off → on transitions.
    pub fn rising_edges(&self) -> usize {
        let w = self.writes();
        let mut prev = false;
        let mut edges = 0;
        for on in w {
            if on && !prev {
                edges += 1;
            }
            prev = on;
        }
        edges
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub struct MockRelay {
    log: WriteLog,
}

impl MockRelay {
    pub fn new() -> (Self, WriteLog) {
        let log = WriteLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl Relay for MockRelay {
    fn drive(&mut self, energised: bool) {
        self.log.0.lock().unwrap().push(energised);
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock(AtomicU64);

#[allow(dead_code)]
impl ManualClock {
    pub fn at(ms: u64) -> Self {
        Self(AtomicU64::new(ms))
    }

    pub fn advance(&self, ms: u64) -> u64 {
        self.0.fetch_add(ms, Ordering::SeqCst) + ms
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Sensors ───────────────────────────────────────────────────

pub struct MockSensors {
    pub next: SensorReading,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn reading(t: f32, smoke: f32, digital: bool) -> Self {
        Self {
            next: SensorReading::new(t, 45.0, smoke, digital),
        }
    }

    pub fn calm() -> Self {
        Self::reading(22.0, 5.0, false)
    }

    pub fn failed() -> Self {
        Self::reading(f32::NAN, 5.0, false)
    }
}

impl SensorPort for MockSensors {
    fn sample(&mut self) -> SensorReading {
        self.next
    }
}

// ── Vision link ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockByteSource {
    rx: VecDeque<u8>,
}

#[allow(dead_code)]
impl MockByteSource {
    pub fn push(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }
}

impl ByteSource for MockByteSource {
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.rx.len());
        for (slot, b) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = b;
        }
        n
    }
}

// ── Telemetry ─────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub records: Vec<TelemetryRecord>,
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, record: &TelemetryRecord) {
        self.records.push(record.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type TestService = SuppressionService<MockRelay, MockRelay, MockRelay>;

pub struct Rig {
    pub svc: TestService,
    pub fan: WriteLog,
    pub pump: WriteLog,
    pub buzzer: WriteLog,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let (fan_relay, fan) = MockRelay::new();
        let (pump_relay, pump) = MockRelay::new();
        let (buzzer_relay, buzzer) = MockRelay::new();
        let svc = SuppressionService::new(
            config,
            DeviceIdString::try_from("FS-TEST01").unwrap(),
            fan_relay,
            pump_relay,
            buzzer_relay,
        );
        Self { svc, fan, pump, buzzer }
    }

    /// Sample `sensors` and run every control cycle once at `now_ms`.
    pub fn cycle(&self, sensors: &mut MockSensors, now_ms: u64) {
        self.svc.sample(sensors);
        self.svc.fan_cycle(now_ms);
        self.svc.pump_cycle(now_ms);
        self.svc.buzzer_cycle(now_ms);
    }
}
