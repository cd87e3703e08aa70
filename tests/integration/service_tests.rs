//! Integration tests for the sensor → assessment → actuator pipeline.
//!
//! Sensor readings go in through a mock `SensorPort`, every control cycle
//! is driven by hand with explicit timestamps, and the assertions are made
//! on the relay write logs.

use crate::mock_hw::{MockSensors, RecordingSink, Rig};

use firesuppress::app::commands::{Actuator, Command, CommandOutcome};
use firesuppress::control::buzzer::BuzzerState;
use firesuppress::control::fan::FanState;
use firesuppress::control::pump::PumpState;
use firesuppress::control::{AlarmReason, ControlMode, ManualAction};
use firesuppress::error::{Error, PumpError};

// ── Quiet room ────────────────────────────────────────────────

#[test]
fn calm_room_leaves_every_actuator_off() {
    let rig = Rig::new();
    let mut sensors = MockSensors::calm();
    for t in (0..10_000).step_by(500) {
        rig.cycle(&mut sensors, t);
    }
    // Only the power-on park write.
    assert_eq!(rig.fan.writes(), [false]);
    assert_eq!(rig.pump.writes(), [false]);
    assert_eq!(rig.buzzer.writes(), [false]);
}

// ── Alarm paths ───────────────────────────────────────────────

#[test]
fn high_temperature_starts_all_three() {
    let rig = Rig::new();
    rig.cycle(&mut MockSensors::reading(55.0, 5.0, false), 1_000);

    assert!(rig.fan.energised());
    assert!(rig.pump.energised());
    assert!(rig.buzzer.energised());
    let fan = rig.svc.fan_snapshot();
    assert_eq!(fan.reason, AlarmReason::HighTemp);
    assert_eq!(rig.svc.pump_snapshot(1_000).spray_count, 1);
}

#[test]
fn smoke_comparator_alone_raises_smoke_alarm() {
    let rig = Rig::new();
    rig.cycle(&mut MockSensors::reading(22.0, 3.0, true), 0);
    assert_eq!(rig.svc.fan_snapshot().reason, AlarmReason::Smoke);
    assert!(rig.fan.energised());
}

#[test]
fn temperature_and_smoke_together_report_both() {
    let rig = Rig::new();
    rig.cycle(&mut MockSensors::reading(60.0, 45.0, false), 0);
    assert_eq!(rig.svc.fan_snapshot().reason, AlarmReason::Both);
}

#[test]
fn fan_holds_inside_hysteresis_band() {
    let rig = Rig::new();
    rig.cycle(&mut MockSensors::reading(55.0, 5.0, false), 0);
    assert_eq!(rig.svc.fan_snapshot().state, FanState::On);

    // 45 °C is below the alarm line but above the safe line.
    rig.cycle(&mut MockSensors::reading(45.0, 5.0, false), 1_000);
    assert_eq!(rig.svc.fan_snapshot().state, FanState::On);

    rig.cycle(&mut MockSensors::reading(35.0, 5.0, false), 2_000);
    assert_eq!(rig.svc.fan_snapshot().state, FanState::Off);
    assert_eq!(rig.svc.fan_snapshot().reason, AlarmReason::None);
    assert_eq!(rig.fan.writes(), [false, true, false]);
}

#[test]
fn invalid_reading_freezes_automatic_control() {
    let rig = Rig::new();
    rig.cycle(&mut MockSensors::reading(55.0, 5.0, false), 0);
    rig.fan.clear();

    let mut failed = MockSensors::failed();
    for t in (1_000..4_000).step_by(500) {
        rig.cycle(&mut failed, t);
    }
    assert_eq!(rig.svc.fan_snapshot().state, FanState::On);
    assert!(rig.fan.writes().is_empty());
}

// ── Pump timing ───────────────────────────────────────────────

#[test]
fn pump_burst_is_capped_then_cools_down() {
    let rig = Rig::new();
    let mut hot = MockSensors::reading(55.0, 5.0, false);

    rig.cycle(&mut hot, 0);
    assert_eq!(rig.svc.pump_snapshot(0).state, PumpState::On);

    rig.svc.pump_cycle(4_500);
    assert_eq!(rig.svc.pump_snapshot(4_500).state, PumpState::On);

    rig.svc.pump_cycle(5_000);
    let snap = rig.svc.pump_snapshot(5_000);
    assert_eq!(snap.state, PumpState::Cooldown);
    assert_eq!(snap.total_spray_ms, 5_000);
    assert_eq!(snap.cooldown_remaining_ms, 10_000);

    // Still on fire, but the pump must rest.
    for t in (5_500..15_000).step_by(500) {
        rig.svc.pump_cycle(t);
        assert!(!rig.pump.energised(), "pump ran during cooldown at {t}");
    }

    rig.svc.pump_cycle(15_000);
    let snap = rig.svc.pump_snapshot(15_000);
    assert_eq!(snap.state, PumpState::On);
    assert_eq!(snap.spray_count, 2);
    assert_eq!(rig.pump.writes(), [false, true, false, true]);
}

#[test]
fn pump_is_not_stopped_by_recovery() {
    let rig = Rig::new();
    rig.cycle(&mut MockSensors::reading(55.0, 5.0, false), 0);
    rig.cycle(&mut MockSensors::calm(), 1_000);
    assert_eq!(rig.svc.pump_snapshot(1_000).state, PumpState::On);
    rig.svc.pump_cycle(5_000);
    assert_eq!(rig.svc.pump_snapshot(5_000).state, PumpState::Cooldown);
}

// ── Buzzer pattern ────────────────────────────────────────────

/// Behaviour decision: inside an alarm episode the output phase flips
/// once the current phase's own duration has elapsed (500 ms on, 300 ms
/// off).  Eight seconds of 50 ms buzzer cycles should sound about
/// `8000 / 800` times.
#[test]
fn buzzer_beeps_at_pattern_rate() {
    let rig = Rig::new();
    rig.svc.sample(&mut MockSensors::reading(55.0, 5.0, false));
    for t in (0..8_000).step_by(50) {
        rig.svc.buzzer_cycle(t);
    }
    let beeps = rig.buzzer.rising_edges();
    assert!((9..=11).contains(&beeps), "got {beeps} beeps");
    assert_eq!(rig.svc.buzzer_snapshot().state, BuzzerState::On);
}

#[test]
fn buzzer_auto_off_latches_until_recovery() {
    let rig = Rig::new();
    let mut hot = MockSensors::reading(55.0, 5.0, false);
    rig.svc.sample(&mut hot);
    for t in (0..=60_000).step_by(50) {
        rig.svc.buzzer_cycle(t);
    }
    let snap = rig.svc.buzzer_snapshot();
    assert_eq!(snap.state, BuzzerState::Off);
    assert!(snap.timed_out);
    assert!(!rig.buzzer.energised());

    // Fire persists: the latch keeps it quiet.
    for t in (60_050..62_000).step_by(50) {
        rig.svc.buzzer_cycle(t);
    }
    assert_eq!(rig.svc.buzzer_snapshot().state, BuzzerState::Off);

    // Full recovery clears the latch; the next fire sounds again.
    rig.svc.sample(&mut MockSensors::calm());
    rig.svc.buzzer_cycle(62_000);
    assert!(!rig.svc.buzzer_snapshot().timed_out);
    rig.svc.sample(&mut hot);
    rig.svc.buzzer_cycle(63_000);
    assert_eq!(rig.svc.buzzer_snapshot().state, BuzzerState::On);
    assert!(rig.buzzer.energised());
}

// ── Remote control ────────────────────────────────────────────

#[test]
fn actions_are_ignored_in_auto_mode() {
    let rig = Rig::new();
    let outcome = rig.svc.apply(Command::Switch(Actuator::Fan, ManualAction::On), 0);
    assert_eq!(outcome, CommandOutcome::IgnoredAutoMode);
    assert_eq!(rig.fan.writes(), [false]);
}

#[test]
fn manual_fan_ignores_fire_and_obeys_commands() {
    let rig = Rig::new();
    rig.svc.apply(Command::SetMode(Actuator::Fan, ControlMode::Manual), 0);

    rig.cycle(&mut MockSensors::reading(70.0, 50.0, true), 100);
    assert_eq!(rig.svc.fan_snapshot().state, FanState::Off);

    assert_eq!(
        rig.svc.apply(Command::Switch(Actuator::Fan, ManualAction::Toggle), 200),
        CommandOutcome::Applied
    );
    assert!(rig.fan.energised());
    rig.svc.apply(Command::Switch(Actuator::Fan, ManualAction::Off), 300);
    assert!(!rig.fan.energised());
}

#[test]
fn returning_fan_to_auto_converges_immediately() {
    let rig = Rig::new();
    rig.svc.apply(Command::SetMode(Actuator::Fan, ControlMode::Manual), 0);
    rig.svc.apply(Command::Switch(Actuator::Fan, ManualAction::On), 0);
    rig.svc.sample(&mut MockSensors::calm());

    rig.svc.apply(Command::SetMode(Actuator::Fan, ControlMode::Auto), 500);
    assert_eq!(rig.svc.fan_snapshot().state, FanState::Off);
    assert_eq!(rig.svc.fan_snapshot().mode, ControlMode::Auto);
}

#[test]
fn manual_pump_spray_refused_during_cooldown() {
    let rig = Rig::new();
    rig.svc.apply(Command::SetMode(Actuator::Pump, ControlMode::Manual), 0);
    rig.svc.apply(Command::Switch(Actuator::Pump, ManualAction::On), 0);
    assert!(rig.pump.energised());

    // Manual spray is clamped to the 5 s ceiling.
    rig.svc.pump_cycle(5_000);
    assert_eq!(rig.svc.pump_snapshot(5_000).state, PumpState::Cooldown);

    let outcome = rig.svc.apply(Command::Switch(Actuator::Pump, ManualAction::On), 6_000);
    assert_eq!(
        outcome,
        CommandOutcome::Rejected(Error::Pump(PumpError::CoolingDown { remaining_ms: 9_000 }))
    );
    assert!(!rig.pump.energised());
}

#[test]
fn manual_pump_off_enters_cooldown() {
    let rig = Rig::new();
    rig.svc.apply(Command::SetMode(Actuator::Pump, ControlMode::Manual), 0);
    rig.svc.apply(Command::Switch(Actuator::Pump, ManualAction::On), 0);
    rig.svc.apply(Command::Switch(Actuator::Pump, ManualAction::Off), 2_000);
    let snap = rig.svc.pump_snapshot(2_000);
    assert_eq!(snap.state, PumpState::Cooldown);
    assert_eq!(snap.total_spray_ms, 2_000);
}

#[test]
fn manual_buzzer_is_a_steady_tone() {
    let rig = Rig::new();
    rig.svc.apply(Command::SetMode(Actuator::Buzzer, ControlMode::Manual), 0);
    rig.svc.apply(Command::Switch(Actuator::Buzzer, ManualAction::On), 0);
    for t in (0..70_000).step_by(50) {
        rig.svc.buzzer_cycle(t);
    }
    assert_eq!(rig.buzzer.writes(), [false, true]);
    assert!(!rig.svc.buzzer_snapshot().timed_out);
}

#[test]
fn switching_buzzer_to_manual_silences_it() {
    let rig = Rig::new();
    rig.cycle(&mut MockSensors::reading(55.0, 5.0, false), 0);
    assert!(rig.buzzer.energised());
    rig.svc.apply(Command::SetMode(Actuator::Buzzer, ControlMode::Manual), 100);
    assert!(!rig.buzzer.energised());
    assert_eq!(rig.svc.buzzer_snapshot().state, BuzzerState::Off);
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_skipped_without_a_valid_reading() {
    let rig = Rig::new();
    let mut sink = RecordingSink::default();
    assert!(!rig.svc.publish_telemetry(&mut sink, 0));

    rig.svc.sample(&mut MockSensors::failed());
    assert!(!rig.svc.publish_telemetry(&mut sink, 1_000));
    assert!(sink.records.is_empty());
}

#[test]
fn telemetry_reflects_actuator_state() {
    let rig = Rig::new();
    rig.cycle(&mut MockSensors::reading(55.04, 12.36, false), 1_000);
    let mut sink = RecordingSink::default();
    assert!(rig.svc.publish_telemetry(&mut sink, 2_000));

    let rec = &sink.records[0];
    assert_eq!(rec.device_id.as_str(), "FS-TEST01");
    assert!((rec.temperature - 55.0).abs() < 1e-4);
    assert!((rec.smoke_level - 12.4).abs() < 1e-4);
    assert_eq!(rec.fan_state, "on");
    assert_eq!(rec.alarm_reason, "high_temp");
    assert_eq!(rec.pump_state, "on");
    assert_eq!(rec.pump_spray_count, 1);
    assert_eq!(rec.buzzer_state, "on");
    assert_eq!(rec.vision_fire, "none");
    assert_eq!(rec.timestamp, 2_000);

    let json = rec.to_json().unwrap();
    assert!(json.contains(r#""fan_mode":"auto""#));
    assert!(json.contains(r#""unit":{"temperature":"celsius","humidity":"percent","smoke_level":"percent"}"#));
}
