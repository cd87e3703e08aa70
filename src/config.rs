//! System configuration parameters
//!
//! All tunable thresholds and durations for the fire-suppression controller.
//! The defaults are the compile-time values the firmware ships with; the
//! struct exists so tests and the boot path can reason about them as data.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Fire thresholds (hysteresis pairs) ---
    /// Temperature (°C) above which the environment is treated as on fire
    pub temp_alarm_c: f32,
    /// Temperature (°C) below which automatic recovery is allowed
    pub temp_safe_c: f32,
    /// Smoke concentration (%) above which the environment is treated as on fire
    pub smoke_alarm_pct: f32,
    /// Smoke concentration (%) below which automatic recovery is allowed
    pub smoke_safe_pct: f32,

    // --- Pump ---
    /// Hard cap on one continuous spray (ms)
    pub pump_max_on_ms: u32,
    /// Mandatory rest after every spray (ms)
    pub pump_cooldown_ms: u32,
    /// Burst length requested by the sensor-driven policy (ms)
    pub pump_auto_spray_ms: u32,
    /// Burst length requested by a remote `on` command (ms, clamped)
    pub pump_manual_spray_ms: u32,
    /// Burst length requested on vision-confirmed fire (ms, clamped)
    pub vision_spray_ms: u32,

    // --- Buzzer ---
    /// Audible phase of the alarm pattern (ms)
    pub buzzer_beep_on_ms: u32,
    /// Silent phase of the alarm pattern (ms)
    pub buzzer_beep_off_ms: u32,
    /// Longest an automatic alarm may sound before forced silence (ms)
    pub buzzer_auto_off_ms: u32,

    // --- Vision ---
    /// Consecutive flame tokens needed to escalate Detected -> Confirmed
    pub vision_confirm_count: u32,
    /// Silence after the last flame token before the episode ends (ms)
    pub vision_timeout_ms: u32,

    // --- Loop periods ---
    pub sensor_period_ms: u32,
    pub vision_period_ms: u32,
    pub fan_period_ms: u32,
    pub pump_period_ms: u32,
    pub buzzer_period_ms: u32,
    pub telemetry_period_ms: u32,
    pub command_period_ms: u32,

    // --- Startup settling ---
    pub vision_start_delay_ms: u32,
    pub fan_start_delay_ms: u32,
    pub pump_start_delay_ms: u32,
    pub buzzer_start_delay_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Thresholds
            temp_alarm_c: 50.0,
            temp_safe_c: 40.0,
            smoke_alarm_pct: 30.0,
            smoke_safe_pct: 15.0,

            // Pump
            pump_max_on_ms: 5_000,
            pump_cooldown_ms: 10_000,
            pump_auto_spray_ms: 5_000,
            pump_manual_spray_ms: 10_000,
            vision_spray_ms: 15_000,

            // Buzzer
            buzzer_beep_on_ms: 500,
            buzzer_beep_off_ms: 300,
            buzzer_auto_off_ms: 60_000,

            // Vision
            vision_confirm_count: 1, // immediate, no debounce
            vision_timeout_ms: 5_000,

            // Loops
            sensor_period_ms: 2_000,
            vision_period_ms: 10,
            fan_period_ms: 1_000,
            pump_period_ms: 500,
            buzzer_period_ms: 50,
            telemetry_period_ms: 1_000,
            command_period_ms: 50,

            // Settling
            vision_start_delay_ms: 1_000,
            fan_start_delay_ms: 2_000,
            pump_start_delay_ms: 3_000,
            buzzer_start_delay_ms: 2_000,
        }
    }
}

impl SystemConfig {
    /// Reject parameter sets the controllers cannot run safely with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.temp_alarm_c <= self.temp_safe_c {
            return Err(Error::Config("temperature alarm must be above safe threshold"));
        }
        if self.smoke_alarm_pct <= self.smoke_safe_pct {
            return Err(Error::Config("smoke alarm must be above safe threshold"));
        }
        if self.pump_max_on_ms == 0 || self.pump_cooldown_ms == 0 {
            return Err(Error::Config("pump durations must be non-zero"));
        }
        if self.buzzer_beep_on_ms == 0 || self.buzzer_beep_off_ms == 0 || self.buzzer_auto_off_ms == 0 {
            return Err(Error::Config("buzzer durations must be non-zero"));
        }
        if self.vision_confirm_count == 0 {
            return Err(Error::Config("vision confirm count must be at least 1"));
        }
        let periods = [
            self.sensor_period_ms,
            self.vision_period_ms,
            self.fan_period_ms,
            self.pump_period_ms,
            self.buzzer_period_ms,
            self.telemetry_period_ms,
            self.command_period_ms,
        ];
        if periods.contains(&0) {
            return Err(Error::Config("loop periods must be non-zero"));
        }
        Ok(())
    }
}
