//! Integration tests for the vision channel: serial bytes in, confirmed
//! fire out, actuators driven and released.

use crate::mock_hw::{ManualClock, MockByteSource, MockSensors, Rig};

use firesuppress::app::commands::{Actuator, Command};
use firesuppress::config::SystemConfig;
use firesuppress::control::buzzer::BuzzerState;
use firesuppress::control::fan::FanState;
use firesuppress::control::pump::PumpState;
use firesuppress::control::{AlarmReason, ControlMode};
use firesuppress::vision::FireConfidence;

fn fire_at(rig: &Rig, link: &mut MockByteSource, clock: &ManualClock, ms: u64) {
    clock.set(ms);
    link.push(b"fire\n");
    rig.svc.poll_vision(link, clock);
}

#[test]
fn confirmed_fire_drives_everything_in_a_cool_room() {
    let rig = Rig::new();
    rig.svc.sample(&mut MockSensors::reading(20.0, 2.0, false));
    let (mut link, clock) = (MockByteSource::default(), ManualClock::at(1_000));

    fire_at(&rig, &mut link, &clock, 1_000);

    assert_eq!(rig.svc.vision_snapshot().confidence, FireConfidence::Confirmed);
    assert!(rig.fan.energised());
    assert!(rig.pump.energised());
    assert!(rig.buzzer.energised());
    assert_eq!(rig.svc.fan_snapshot().reason, AlarmReason::Both);
}

#[test]
fn vision_burst_is_clamped_to_pump_ceiling() {
    let rig = Rig::new();
    let (mut link, clock) = (MockByteSource::default(), ManualClock::default());
    fire_at(&rig, &mut link, &clock, 0);

    rig.svc.pump_cycle(4_999);
    assert_eq!(rig.svc.pump_snapshot(4_999).state, PumpState::On);
    rig.svc.pump_cycle(5_000);
    assert_eq!(rig.svc.pump_snapshot(5_000).state, PumpState::Cooldown);

    // Tokens during cooldown do not restart it.
    fire_at(&rig, &mut link, &clock, 6_000);
    assert_eq!(rig.svc.pump_snapshot(6_000).state, PumpState::Cooldown);
}

#[test]
fn confirmed_vision_blocks_sensor_recovery() {
    let rig = Rig::new();
    let (mut link, clock) = (MockByteSource::default(), ManualClock::default());
    fire_at(&rig, &mut link, &clock, 0);

    let mut calm = MockSensors::calm();
    rig.cycle(&mut calm, 1_000);
    assert_eq!(rig.svc.fan_snapshot().state, FanState::On);
    assert_eq!(rig.svc.buzzer_snapshot().state, BuzzerState::On);
}

#[test]
fn silence_releases_buzzer_and_fan_exactly_once() {
    let rig = Rig::new();
    let (mut link, clock) = (MockByteSource::default(), ManualClock::default());
    fire_at(&rig, &mut link, &clock, 1_000);

    // Exactly at the timeout the episode is still live.
    clock.set(6_000);
    rig.svc.poll_vision(&mut link, &clock);
    assert_eq!(rig.svc.vision_snapshot().confidence, FireConfidence::Confirmed);

    clock.set(6_001);
    rig.svc.poll_vision(&mut link, &clock);
    assert_eq!(rig.svc.vision_snapshot().confidence, FireConfidence::None);
    assert_eq!(rig.fan.writes(), [false, true, false]);
    assert!(!rig.buzzer.energised());
    assert_eq!(rig.svc.buzzer_snapshot().state, BuzzerState::Off);

    let fan_writes = rig.fan.writes().len();
    let buzzer_writes = rig.buzzer.writes().len();
    for t in (6_100..10_000).step_by(100) {
        clock.set(t);
        rig.svc.poll_vision(&mut link, &clock);
    }
    assert_eq!(rig.fan.writes().len(), fan_writes);
    assert_eq!(rig.buzzer.writes().len(), buzzer_writes);
}

#[test]
fn repeated_tokens_are_idempotent() {
    let rig = Rig::new();
    let (mut link, clock) = (MockByteSource::default(), ManualClock::default());
    for t in (0..3_000).step_by(100) {
        fire_at(&rig, &mut link, &clock, t);
    }
    assert_eq!(rig.fan.writes(), [false, true]);
    assert_eq!(rig.pump.writes(), [false, true]);
    assert_eq!(rig.buzzer.writes(), [false, true]);
    let snap = rig.svc.vision_snapshot();
    assert_eq!(snap.total_fire_events, 1);
    assert_eq!(snap.fire_event_count, 30);
}

#[test]
fn confirmation_waits_for_enough_tokens() {
    let mut config = SystemConfig::default();
    config.vision_confirm_count = 3;
    let rig = Rig::with_config(config);
    let (mut link, clock) = (MockByteSource::default(), ManualClock::default());

    fire_at(&rig, &mut link, &clock, 0);
    fire_at(&rig, &mut link, &clock, 100);
    assert_eq!(rig.svc.vision_snapshot().confidence, FireConfidence::Detected);
    assert!(!rig.fan.energised());

    fire_at(&rig, &mut link, &clock, 200);
    assert_eq!(rig.svc.vision_snapshot().confidence, FireConfidence::Confirmed);
    assert!(rig.fan.energised());
}

#[test]
fn manual_actuators_are_left_alone() {
    let rig = Rig::new();
    rig.svc.apply(Command::SetMode(Actuator::Fan, ControlMode::Manual), 0);
    let (mut link, clock) = (MockByteSource::default(), ManualClock::default());
    fire_at(&rig, &mut link, &clock, 0);

    assert!(!rig.fan.energised());
    assert!(rig.pump.energised());
    assert!(rig.buzzer.energised());
}

#[test]
fn framing_survives_noise_case_and_split_chunks() {
    let rig = Rig::new();
    let clock = ManualClock::default();
    let mut link = MockByteSource::default();

    // Overlong garbage is discarded without a match.
    link.push(&[b'x'; 40]);
    link.push(b"\nnone\r\n");
    rig.svc.poll_vision(&mut link, &clock);
    assert_eq!(rig.svc.vision_snapshot().confidence, FireConfidence::None);

    assert_eq!(rig.svc.feed_vision(b"FI", 10), 0);
    assert_eq!(rig.svc.feed_vision(b"re\r\n", 20), 1);
    assert_eq!(rig.svc.vision_snapshot().confidence, FireConfidence::Confirmed);
}

#[test]
fn new_confirmation_sounds_buzzer_after_sensor_auto_off() {
    let rig = Rig::new();
    rig.svc.sample(&mut MockSensors::reading(55.0, 5.0, false));
    for t in (0..=60_000).step_by(50) {
        rig.svc.buzzer_cycle(t);
    }
    let b = rig.svc.buzzer_snapshot();
    assert_eq!(b.state, BuzzerState::Off);
    assert!(b.timed_out);

    // Cooled into the hysteresis band: no recovery, latch still set.
    rig.svc.sample(&mut MockSensors::reading(45.0, 5.0, false));
    rig.svc.buzzer_cycle(65_000);
    assert!(rig.svc.buzzer_snapshot().timed_out);

    let (mut link, clock) = (MockByteSource::default(), ManualClock::default());
    fire_at(&rig, &mut link, &clock, 70_000);
    rig.svc.buzzer_cycle(70_000);

    let b = rig.svc.buzzer_snapshot();
    assert_eq!(rig.svc.vision_snapshot().confidence, FireConfidence::Confirmed);
    assert_eq!(b.state, BuzzerState::On);
    assert!(!b.timed_out);
    assert_eq!(b.alarm_start_ms, 70_000);
    assert!(rig.buzzer.energised());
}

#[test]
fn tokens_within_one_episode_respect_auto_off() {
    let rig = Rig::new();
    rig.svc.sample(&mut MockSensors::reading(45.0, 5.0, false));
    let (mut link, clock) = (MockByteSource::default(), ManualClock::default());

    for t in (0..=60_000).step_by(50) {
        if t % 1_000 == 0 {
            fire_at(&rig, &mut link, &clock, t);
        }
        rig.svc.buzzer_cycle(t);
    }
    assert!(rig.svc.buzzer_snapshot().timed_out);

    fire_at(&rig, &mut link, &clock, 60_500);
    rig.svc.buzzer_cycle(60_500);
    assert_eq!(rig.svc.buzzer_snapshot().state, BuzzerState::Off);
    assert!(!rig.buzzer.energised());
}
