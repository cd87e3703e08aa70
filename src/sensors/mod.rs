//! Sensor subsystem — individual drivers, the aggregating [`SensorHub`],
//! and the shared [`SensorStore`] every control loop reads from.
//!
//! The sampling task is the only writer: it calls [`SensorHub::read_all`]
//! once per period and replaces the cached [`SensorReading`] wholesale.
//! Readers always get a full copy, never a mix of two samples.

pub mod dht11;
pub mod mq2;

use log::warn;
use serde::Serialize;

use crate::error::SensorError;
use crate::sync::Guarded;
use dht11::Dht11Sensor;
use mq2::Mq2Sensor;

// ── Reading ───────────────────────────────────────────────────

/// One complete environmental sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub smoke_pct: f32,
    pub smoke_digital_alarm: bool,
    /// `false` when temperature or humidity acquisition produced NaN.
    pub valid: bool,
}

impl SensorReading {
    /// Build a reading, deriving `valid` from the DHT fields.
    pub fn new(temperature_c: f32, humidity_pct: f32, smoke_pct: f32, smoke_digital_alarm: bool) -> Self {
        Self {
            temperature_c,
            humidity_pct,
            smoke_pct,
            smoke_digital_alarm,
            valid: !temperature_c.is_nan() && !humidity_pct.is_nan(),
        }
    }

    /// Boot value before the first sample lands.  Invalid, so every
    /// controller skips its automatic evaluation until real data arrives.
    pub const fn unset() -> Self {
        Self {
            temperature_c: f32::NAN,
            humidity_pct: f32::NAN,
            smoke_pct: 0.0,
            smoke_digital_alarm: false,
            valid: false,
        }
    }

    /// `Ok` when the automatic policies may act on this sample.
    pub fn check(&self) -> Result<(), SensorError> {
        if self.valid {
            Ok(())
        } else {
            Err(SensorError::NotANumber)
        }
    }
}

impl Default for SensorReading {
    fn default() -> Self {
        Self::unset()
    }
}

// ── Store ─────────────────────────────────────────────────────

/// Thread-safe cache of the latest reading.
#[derive(Debug)]
pub struct SensorStore {
    latest: Guarded<SensorReading>,
}

impl SensorStore {
    pub const fn new() -> Self {
        Self {
            latest: Guarded::new(SensorReading::unset()),
        }
    }

    /// Replace the cached reading atomically.
    pub fn write(&self, reading: SensorReading) {
        self.latest.set(reading);
    }

    /// Atomic full copy of the cached reading.
    pub fn read(&self) -> SensorReading {
        self.latest.get()
    }

    /// The cached reading if it may drive automatic policy this cycle.
    pub fn read_valid(&self) -> Option<SensorReading> {
        let r = self.read();
        r.valid.then_some(r)
    }
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Hub ───────────────────────────────────────────────────────

/// Aggregates the DHT11 and MQ-2 drivers into one sample.
pub struct SensorHub {
    pub dht: Dht11Sensor,
    pub smoke: Mq2Sensor,
}

impl SensorHub {
    pub fn new(dht: Dht11Sensor, smoke: Mq2Sensor) -> Self {
        Self { dht, smoke }
    }

    /// Read every sensor and return a unified reading.
    ///
    /// A failed DHT11 transaction yields NaN temperature/humidity (and so
    /// an invalid reading) rather than an error: the smoke fields are still
    /// worth publishing to the log.
    pub fn read_all(&mut self) -> SensorReading {
        let (t, h) = match self.dht.read() {
            Ok(d) => (d.temperature_c, d.humidity_pct),
            Err(e) => {
                warn!("DHT11: {}", e);
                (f32::NAN, f32::NAN)
            }
        };
        let smoke = self.smoke.read();
        SensorReading::new(t, h, smoke.percent, smoke.digital_alarm)
    }
}
