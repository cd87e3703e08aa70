//! Log-based telemetry sink.
//!
//! Writes one `TELEM |` line per record to the ESP-IDF logger (UART /
//! USB-CDC).  Used when no broker is reachable.

use log::info;

use crate::app::events::TelemetryRecord;
use crate::app::ports::TelemetrySink;

pub struct LogTelemetrySink;

impl LogTelemetrySink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogTelemetrySink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for LogTelemetrySink {
    fn publish(&mut self, t: &TelemetryRecord) {
        info!(
            "TELEM | T={:.1}\u{00b0}C RH={:.1}% smoke={:.1}%{} | fan={}/{} ({}) | \
             pump={}/{} n={} cd={}ms | buzzer={}/{} | vision={}",
            t.temperature,
            t.humidity,
            t.smoke_level,
            if t.smoke_alarm { " DO" } else { "" },
            t.fan_state,
            t.fan_mode,
            t.alarm_reason,
            t.pump_state,
            t.pump_mode,
            t.pump_spray_count,
            t.pump_cooldown_remaining_ms,
            t.buzzer_state,
            t.buzzer_mode,
            t.vision_fire,
        );
    }
}
