//! Actuator control — the fire-assessment merge and the three actuator
//! state machines.
//!
//! Every controller answers the same question ("is there a fire, and may
//! we stand down?") through [`FireAssessment::assess`], so the rule that a
//! vision-confirmed fire overrides sensor recovery lives in one place.
//!
//! Controllers are plain `&mut self` state machines that own their relay.
//! Sharing and locking is done one level up by the service.

pub mod buzzer;
pub mod fan;
pub mod pump;

use serde::Serialize;

use crate::config::SystemConfig;
use crate::sensors::SensorReading;

// ── Mode ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Auto,
    Manual,
}

impl ControlMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

/// A remote switch request for a manual-mode actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualAction {
    On,
    Off,
    Toggle,
}

/// What happened to a manual request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    Applied,
    /// The actuator is in auto mode; the request was discarded.
    IgnoredAuto,
}

// ── Alarm reason ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmReason {
    #[default]
    None,
    HighTemp,
    Smoke,
    Both,
}

impl AlarmReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HighTemp => "high_temp",
            Self::Smoke => "smoke",
            Self::Both => "both",
        }
    }
}

// ── Thresholds ────────────────────────────────────────────────

/// Alarm / safe hysteresis pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub temp_alarm_c: f32,
    pub temp_safe_c: f32,
    pub smoke_alarm_pct: f32,
    pub smoke_safe_pct: f32,
}

impl From<&SystemConfig> for Thresholds {
    fn from(c: &SystemConfig) -> Self {
        Self {
            temp_alarm_c: c.temp_alarm_c,
            temp_safe_c: c.temp_safe_c,
            smoke_alarm_pct: c.smoke_alarm_pct,
            smoke_safe_pct: c.smoke_safe_pct,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&SystemConfig::default())
    }
}

// ── Assessment ────────────────────────────────────────────────

/// The merged fire verdict for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireAssessment {
    pub reason: AlarmReason,
    /// All sensors are under their safe thresholds and vision is not
    /// confirming a fire.  Only then may an actuator stand down.
    pub recovery_allowed: bool,
}

impl FireAssessment {
    /// Merge a sensor reading with the vision channel.
    ///
    /// Between the alarm and safe thresholds neither flag is set, so the
    /// actuators hold their current state.
    pub fn assess(reading: &SensorReading, t: &Thresholds, vision_confirmed: bool) -> Self {
        let high_temp = reading.temperature_c > t.temp_alarm_c;
        let smoke = reading.smoke_pct > t.smoke_alarm_pct || reading.smoke_digital_alarm;

        let reason = if vision_confirmed {
            AlarmReason::Both
        } else {
            match (high_temp, smoke) {
                (true, true) => AlarmReason::Both,
                (true, false) => AlarmReason::HighTemp,
                (false, true) => AlarmReason::Smoke,
                (false, false) => AlarmReason::None,
            }
        };

        let recovery_allowed = reading.temperature_c < t.temp_safe_c
            && reading.smoke_pct < t.smoke_safe_pct
            && !reading.smoke_digital_alarm
            && !vision_confirmed;

        Self {
            reason,
            recovery_allowed,
        }
    }

    /// The verdict used when vision confirms a fire with no sensor input.
    pub const fn confirmed() -> Self {
        Self {
            reason: AlarmReason::Both,
            recovery_allowed: false,
        }
    }

    pub fn fire(&self) -> bool {
        self.reason != AlarmReason::None
    }
}
