//! Outbound telemetry.
//!
//! The [`SuppressionService`](super::service::SuppressionService) renders
//! one [`TelemetryRecord`] per publish cycle and hands it to a
//! [`TelemetrySink`](super::ports::TelemetrySink).  The serde field names
//! are the wire names the dashboard consumes.

use serde::Serialize;

use crate::adapters::device_id::DeviceIdString;
use crate::control::buzzer::BuzzerSnapshot;
use crate::control::fan::FanSnapshot;
use crate::control::pump::PumpSnapshot;
use crate::sensors::SensorReading;
use crate::vision::{FireConfidence, VisionSnapshot};

/// Unit labels attached to every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Units {
    pub temperature: &'static str,
    pub humidity: &'static str,
    pub smoke_level: &'static str,
}

impl Units {
    pub const STANDARD: Self = Self {
        temperature: "celsius",
        humidity: "percent",
        smoke_level: "percent",
    };
}

/// A point-in-time status snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub device_id: DeviceIdString,
    pub temperature: f32,
    pub humidity: f32,
    pub smoke_level: f32,
    pub smoke_alarm: bool,

    pub fan_state: &'static str,
    pub fan_mode: &'static str,
    pub alarm_reason: &'static str,

    pub pump_state: &'static str,
    pub pump_mode: &'static str,
    pub pump_spray_count: u32,
    pub pump_total_spray_ms: u64,
    pub pump_cooldown_remaining_ms: u64,

    pub buzzer_state: &'static str,
    pub buzzer_mode: &'static str,
    pub buzzer_timed_out: bool,

    pub vision_fire: &'static str,
    pub vision_fire_detected: bool,
    pub vision_total_events: u32,

    /// Milliseconds since boot.
    pub timestamp: u64,
    pub unit: Units,
}

/// One decimal place, the resolution the dashboard shows.
pub fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

impl TelemetryRecord {
    pub fn build(
        device_id: &DeviceIdString,
        reading: &SensorReading,
        fan: &FanSnapshot,
        pump: &PumpSnapshot,
        buzzer: &BuzzerSnapshot,
        vision: &VisionSnapshot,
        now_ms: u64,
    ) -> Self {
        Self {
            device_id: device_id.clone(),
            temperature: round1(reading.temperature_c),
            humidity: round1(reading.humidity_pct),
            smoke_level: round1(reading.smoke_pct),
            smoke_alarm: reading.smoke_digital_alarm,
            fan_state: fan.state.as_str(),
            fan_mode: fan.mode.as_str(),
            alarm_reason: fan.reason.as_str(),
            pump_state: pump.state.as_str(),
            pump_mode: pump.mode.as_str(),
            pump_spray_count: pump.spray_count,
            pump_total_spray_ms: pump.total_spray_ms,
            pump_cooldown_remaining_ms: pump.cooldown_remaining_ms,
            buzzer_state: buzzer.state.as_str(),
            buzzer_mode: buzzer.mode.as_str(),
            buzzer_timed_out: buzzer.timed_out,
            vision_fire: vision.confidence.as_str(),
            vision_fire_detected: vision.confidence != FireConfidence::None,
            vision_total_events: vision.total_fire_events,
            timestamp: now_ms,
            unit: Units::STANDARD,
        }
    }

    /// JSON body for the wire.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
