//! Application service — the hexagonal core.
//!
//! [`SuppressionService`] owns every shared entity: the sensor cache, the
//! vision monitor and its line framer, and the three actuator
//! controllers, each behind its own [`Guarded`] cell.  All methods take
//! `&self`, so one `Arc<SuppressionService>` is shared by every control
//! loop.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────────┐ ──▶ TelemetrySink
//!                 │      SuppressionService      │
//!  ByteSource ──▶ │ SensorStore · Vision         │ ──▶ Relay ×3
//!                 │ Fan · Pump · Buzzer          │
//!                 └─────────────────────────────┘
//! ```
//!
//! ## Locking discipline
//!
//! No method ever holds two entity locks at once.  Cross-entity logic is
//! "snapshot, release, act": read what is needed from one cell, drop the
//! lock, then mutate the next.  A vision confirmation therefore drives the
//! actuators from the state read back after the monitor's lock is
//! released; a change in between is tolerated for one cycle.

use log::{debug, info, warn};

use crate::adapters::device_id::DeviceIdString;
use crate::config::SystemConfig;
use crate::control::buzzer::{BeepPattern, BuzzerController, BuzzerSnapshot};
use crate::control::fan::{FanController, FanSnapshot};
use crate::control::pump::{PumpController, PumpSnapshot, PumpTiming};
use crate::control::{ControlMode, FireAssessment, Override, Thresholds};
use crate::sensors::{SensorReading, SensorStore};
use crate::sync::Guarded;
use crate::vision::framer::{is_fire_token, LineFramer};
use crate::vision::{FireConfidence, VisionFireMonitor, VisionSnapshot};

use super::commands::{Actuator, Command, CommandOutcome};
use super::events::TelemetryRecord;
use super::ports::{ByteSource, Clock, Relay, SensorPort, TelemetrySink};

// ───────────────────────────────────────────────────────────────
// SuppressionService
// ───────────────────────────────────────────────────────────────

pub struct SuppressionService<F: Relay, P: Relay, B: Relay> {
    config: SystemConfig,
    thresholds: Thresholds,
    device_id: DeviceIdString,
    sensors: SensorStore,
    framer: Guarded<LineFramer>,
    vision: Guarded<VisionFireMonitor>,
    fan: Guarded<FanController<F>>,
    pump: Guarded<PumpController<P>>,
    buzzer: Guarded<BuzzerController<B>>,
}

impl<F: Relay, P: Relay, B: Relay> SuppressionService<F, P, B> {
    /// Build the core with every actuator Off, every mode Auto, and no
    /// fire on record.
    pub fn new(config: SystemConfig, device_id: DeviceIdString, fan: F, pump: P, buzzer: B) -> Self {
        let thresholds = Thresholds::from(&config);
        let vision = VisionFireMonitor::new(config.vision_confirm_count, config.vision_timeout_ms);
        let pump = PumpController::new(pump, PumpTiming::from(&config));
        let buzzer = BuzzerController::new(buzzer, BeepPattern::from(&config));
        info!(
            "SuppressionService: thresholds T {:.0}/{:.0}\u{00b0}C, smoke {:.0}/{:.0}%",
            thresholds.temp_alarm_c, thresholds.temp_safe_c, thresholds.smoke_alarm_pct, thresholds.smoke_safe_pct
        );
        Self {
            thresholds,
            device_id,
            sensors: SensorStore::new(),
            framer: Guarded::new(LineFramer::new()),
            vision: Guarded::new(vision),
            fan: Guarded::new(FanController::new(fan)),
            pump: Guarded::new(pump),
            buzzer: Guarded::new(buzzer),
            config,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Sampling ──────────────────────────────────────────────

    /// Take one sample and publish it to the store.
    pub fn sample(&self, port: &mut impl SensorPort) -> SensorReading {
        let reading = port.sample();
        if let Err(e) = reading.check() {
            warn!("Sensors: {}, automatic evaluation paused", e);
        } else {
            debug!(
                "Sensors: T={:.1}\u{00b0}C RH={:.1}% smoke={:.1}% DO={}",
                reading.temperature_c, reading.humidity_pct, reading.smoke_pct, reading.smoke_digital_alarm
            );
        }
        self.sensors.write(reading);
        reading
    }

    /// The merged fire verdict for this cycle, or `None` when the cached
    /// reading is invalid and automatic evaluation must be skipped.
    pub fn assessment(&self) -> Option<FireAssessment> {
        let reading = self.sensors.read_valid()?;
        let confirmed = self.vision.with(VisionFireMonitor::is_confirmed);
        Some(FireAssessment::assess(&reading, &self.thresholds, confirmed))
    }

    // ── Vision ────────────────────────────────────────────────

    /// Drain the vision link, act on every flame token, then check the
    /// silence timeout.
    pub fn poll_vision(&self, source: &mut impl ByteSource, clock: &impl Clock) {
        let mut buf = [0u8; 64];
        loop {
            let n = source.read_available(&mut buf);
            if n == 0 {
                break;
            }
            self.feed_vision(&buf[..n], clock.now_ms());
        }
        self.expire_if_silent(clock.now_ms());
    }

    /// Frame a chunk of vision bytes.  Returns how many flame tokens it
    /// contained.
    pub fn feed_vision(&self, bytes: &[u8], now_ms: u64) -> usize {
        let tokens = self.framer.update(|framer| {
            let mut tokens = 0;
            for &b in bytes {
                match framer.push(b) {
                    Ok(Some(line)) if is_fire_token(&line) => tokens += 1,
                    Ok(_) => {}
                    Err(e) => debug!("Vision: {}", e),
                }
            }
            tokens
        });
        for _ in 0..tokens {
            self.on_fire_signal(now_ms);
        }
        tokens
    }

    /// One flame token.  On a confirmed fire every auto-mode actuator is
    /// driven: buzzer on, fan on, pump sprays if it is available.  The
    /// token that confirms an episode also clears the buzzer's auto-off
    /// latch; later tokens in the same episode respect it.
    pub fn on_fire_signal(&self, now_ms: u64) {
        let newly_confirmed = self.vision.update(|m| {
            let before = m.confidence();
            m.on_fire_signal(now_ms) == FireConfidence::Confirmed && before != FireConfidence::Confirmed
        });

        // Read back after the monitor lock is gone.
        if self.vision.with(VisionFireMonitor::confidence) != FireConfidence::Confirmed {
            return;
        }
        let spray_ms = self.config.vision_spray_ms as u64;
        if newly_confirmed {
            self.buzzer.update(|b| b.arm_for_confirmed(now_ms));
        } else {
            self.buzzer.update(|b| b.force_on(now_ms));
        }
        self.fan.update(|f| f.force_on(now_ms));
        self.pump.update(|p| p.force_spray(spray_ms, now_ms));
    }

    /// End the vision episode after the silence timeout.  If suppression
    /// had been active, the buzzer and an auto-mode fan are released.  The
    /// pump is left to finish its burst on its own timer.
    pub fn expire_if_silent(&self, now_ms: u64) {
        let Some(end) = self.vision.update(|m| m.check_timeout(now_ms)) else {
            return;
        };
        if end.was_suppressing {
            self.buzzer.update(|b| b.release(now_ms));
            self.fan.update(|f| f.release(now_ms));
            info!("Vision: suppression deactivated");
        }
    }

    // ── Control cycles ────────────────────────────────────────

    pub fn fan_cycle(&self, now_ms: u64) {
        if let Some(a) = self.assessment() {
            self.fan.update(|f| f.evaluate(&a, now_ms));
        }
    }

    /// Timers first, so a burst that just ended is already in Cooldown
    /// when the policy looks at it.
    pub fn pump_cycle(&self, now_ms: u64) {
        self.pump.update(|p| p.tick(now_ms));
        if let Some(a) = self.assessment() {
            self.pump.update(|p| p.evaluate(&a, now_ms));
        }
    }

    /// Policy first, then the beep phase and auto-off ceiling, which run
    /// even on an invalid reading.
    pub fn buzzer_cycle(&self, now_ms: u64) {
        if let Some(a) = self.assessment() {
            self.buzzer.update(|b| b.evaluate(&a, now_ms));
        }
        self.buzzer.update(|b| b.tick(now_ms));
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a parsed remote command.
    pub fn apply(&self, cmd: Command, now_ms: u64) -> CommandOutcome {
        match cmd {
            Command::SetMode(actuator, mode) => {
                match actuator {
                    Actuator::Fan => {
                        let changed = self.fan.update(|f| f.set_mode(mode));
                        // Back in auto: converge on the current reading now
                        // rather than on the next fan cycle.
                        if changed && mode == ControlMode::Auto {
                            self.fan_cycle(now_ms);
                        }
                    }
                    Actuator::Pump => {
                        self.pump.update(|p| p.set_mode(mode));
                    }
                    Actuator::Buzzer => {
                        self.buzzer.update(|b| b.set_mode(mode, now_ms));
                    }
                }
                CommandOutcome::Applied
            }
            Command::Switch(actuator, action) => {
                let result = match actuator {
                    Actuator::Fan => Ok(self.fan.update(|f| f.manual(action, now_ms))),
                    Actuator::Pump => {
                        let spray_ms = self.config.pump_manual_spray_ms as u64;
                        self.pump.update(|p| p.manual(action, spray_ms, now_ms))
                    }
                    Actuator::Buzzer => Ok(self.buzzer.update(|b| b.manual(action, now_ms))),
                };
                match result {
                    Ok(Override::Applied) => CommandOutcome::Applied,
                    Ok(Override::IgnoredAuto) => CommandOutcome::IgnoredAutoMode,
                    Err(e) => CommandOutcome::Rejected(e.into()),
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn fan_snapshot(&self) -> FanSnapshot {
        self.fan.with(FanController::snapshot)
    }

    pub fn pump_snapshot(&self, now_ms: u64) -> PumpSnapshot {
        self.pump.with(|p| p.snapshot(now_ms))
    }

    pub fn buzzer_snapshot(&self) -> BuzzerSnapshot {
        self.buzzer.with(BuzzerController::snapshot)
    }

    pub fn vision_snapshot(&self) -> VisionSnapshot {
        self.vision.with(VisionFireMonitor::snapshot)
    }

    /// Read-only access to a controller, e.g. to inspect its relay.
    pub fn with_fan<T>(&self, f: impl FnOnce(&FanController<F>) -> T) -> T {
        self.fan.with(f)
    }

    pub fn with_pump<T>(&self, f: impl FnOnce(&PumpController<P>) -> T) -> T {
        self.pump.with(f)
    }

    pub fn with_buzzer<T>(&self, f: impl FnOnce(&BuzzerController<B>) -> T) -> T {
        self.buzzer.with(f)
    }

    // ── Telemetry ─────────────────────────────────────────────

    /// Build a status record, or `None` when the reading is invalid.
    pub fn telemetry(&self, now_ms: u64) -> Option<TelemetryRecord> {
        let reading = self.sensors.read_valid()?;
        Some(TelemetryRecord::build(
            &self.device_id,
            &reading,
            &self.fan_snapshot(),
            &self.pump_snapshot(now_ms),
            &self.buzzer_snapshot(),
            &self.vision_snapshot(),
            now_ms,
        ))
    }

    /// One publish cycle.  Returns whether a record was handed to `sink`.
    pub fn publish_telemetry(&self, sink: &mut impl TelemetrySink, now_ms: u64) -> bool {
        match self.telemetry(now_ms) {
            Some(record) => {
                sink.publish(&record);
                true
            }
            None => {
                debug!("Telemetry: skipped, no valid reading");
                false
            }
        }
    }

    /// One-line summary of every actuator and the vision channel.
    pub fn log_status(&self, now_ms: u64) {
        let fan = self.fan_snapshot();
        let pump = self.pump_snapshot(now_ms);
        let buzzer = self.buzzer_snapshot();
        let vision = self.vision_snapshot();
        info!(
            "STATUS | fan={}/{} ({}) | pump={}/{} sprays={} cd={}ms | buzzer={}/{}{} | vision={} events={}",
            fan.state.as_str(),
            fan.mode.as_str(),
            fan.reason.as_str(),
            pump.state.as_str(),
            pump.mode.as_str(),
            pump.spray_count,
            pump.cooldown_remaining_ms,
            buzzer.state.as_str(),
            buzzer.mode.as_str(),
            if buzzer.timed_out { " TIMED-OUT" } else { "" },
            vision.confidence.as_str(),
            vision.total_fire_events,
        );
    }
}
