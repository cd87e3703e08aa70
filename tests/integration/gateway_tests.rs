//! Integration tests for the command path: topic → inbox → service.

use crate::mock_hw::{MockSensors, Rig};

use firesuppress::adapters::mqtt::endpoint_for_topic;
use firesuppress::app::commands::{Actuator, CommandOutcome, Endpoint};
use firesuppress::app::gateway::{CommandGateway, MAX_PAYLOAD};
use firesuppress::control::fan::FanState;
use firesuppress::control::pump::PumpState;
use firesuppress::control::ControlMode;
use firesuppress::error::CommandError;

fn submit(gw: &CommandGateway, topic: &str, payload: &str) -> Result<(), CommandError> {
    gw.submit(endpoint_for_topic(topic)?, payload.as_bytes())
}

#[test]
fn topic_to_actuator_round_trip() {
    let rig = Rig::new();
    let gw = CommandGateway::new();

    submit(&gw, "fire_alarm/fan/mode", r#"{"action":"manual"}"#).unwrap();
    submit(&gw, "fire_alarm/fan/control", r#"{"action":"on"}"#).unwrap();
    assert_eq!(gw.pending(), 2);

    assert_eq!(gw.process(&rig.svc, 100), 2);
    assert_eq!(gw.pending(), 0);
    let fan = rig.svc.fan_snapshot();
    assert_eq!(fan.mode, ControlMode::Manual);
    assert_eq!(fan.state, FanState::On);
}

#[test]
fn malformed_payload_changes_nothing() {
    let rig = Rig::new();
    let gw = CommandGateway::new();
    submit(&gw, "fire_alarm/fan/mode", r#"{"action":"manual"}"#).unwrap();
    gw.process(&rig.svc, 0);
    rig.fan.clear();

    submit(&gw, "fire_alarm/fan/control", "{}").unwrap();
    submit(&gw, "fire_alarm/fan/control", "on").unwrap();
    submit(&gw, "fire_alarm/fan/control", r#"{"action":"spin"}"#).unwrap();
    assert_eq!(gw.process(&rig.svc, 10), 0);

    assert!(rig.fan.writes().is_empty());
    assert_eq!(rig.svc.fan_snapshot().state, FanState::Off);
}

#[test]
fn positional_array_payload_is_dropped() {
    let rig = Rig::new();
    let gw = CommandGateway::new();
    submit(&gw, "fire_alarm/fan/mode", r#"{"action":"manual"}"#).unwrap();
    gw.process(&rig.svc, 0);
    rig.fan.clear();

    gw.submit(Endpoint::action(Actuator::Fan), br#"["on"]"#).unwrap();
    assert_eq!(gw.process(&rig.svc, 10), 0);
    assert_eq!(
        gw.dispatch(&rig.svc, Endpoint::mode(Actuator::Fan), br#"["auto"]"#, 20),
        Err(CommandError::Malformed)
    );

    assert!(rig.fan.writes().is_empty());
    let fan = rig.svc.fan_snapshot();
    assert_eq!(fan.state, FanState::Off);
    assert_eq!(fan.mode, ControlMode::Manual);
}

#[test]
fn dispatch_reports_each_outcome() {
    let rig = Rig::new();
    let gw = CommandGateway::new();
    let pump = Endpoint::action(Actuator::Pump);

    assert_eq!(
        gw.dispatch(&rig.svc, pump, br#"{"action":"on"}"#, 0),
        Ok(CommandOutcome::IgnoredAutoMode)
    );
    assert_eq!(
        gw.dispatch(&rig.svc, pump, br#"{"action":"auto"}"#, 0),
        Err(CommandError::UnknownAction)
    );
    gw.dispatch(&rig.svc, Endpoint::mode(Actuator::Pump), br#"{"action":"manual"}"#, 0)
        .unwrap();
    assert_eq!(gw.dispatch(&rig.svc, pump, br#"{"action":"toggle"}"#, 0), Ok(CommandOutcome::Applied));
    assert_eq!(rig.svc.pump_snapshot(0).state, PumpState::On);

    let stopped = gw.dispatch(&rig.svc, pump, br#"{"action":"off"}"#, 1_000);
    assert_eq!(stopped, Ok(CommandOutcome::Applied));
    let again = gw.dispatch(&rig.svc, pump, br#"{"action":"on"}"#, 2_000).unwrap();
    assert!(matches!(again, CommandOutcome::Rejected(_)));
}

#[test]
fn unknown_topic_never_reaches_inbox() {
    let gw = CommandGateway::new();
    assert_eq!(
        submit(&gw, "fire_alarm/valve/control", r#"{"action":"on"}"#),
        Err(CommandError::UnknownTopic)
    );
    assert_eq!(gw.pending(), 0);
}

#[test]
fn inbox_drops_when_full_or_oversize() {
    let gw = CommandGateway::new();
    let ep = Endpoint::mode(Actuator::Buzzer);

    let big = vec![b' '; MAX_PAYLOAD + 1];
    assert_eq!(gw.submit(ep, &big), Err(CommandError::PayloadTooLarge));

    let mut accepted = 0;
    while gw.submit(ep, br#"{"action":"manual"}"#).is_ok() {
        accepted += 1;
        assert!(accepted <= 64, "inbox never filled");
    }
    assert_eq!(gw.submit(ep, br#"{"action":"auto"}"#), Err(CommandError::InboxFull));
    assert_eq!(gw.pending(), accepted);
}

#[test]
fn mode_commands_apply_even_mid_alarm() {
    let rig = Rig::new();
    let gw = CommandGateway::new();
    rig.cycle(&mut MockSensors::reading(55.0, 5.0, false), 0);
    assert!(rig.buzzer.energised());

    submit(&gw, "fire_alarm/buzzer/mode", r#"{"action":"manual"}"#).unwrap();
    gw.process(&rig.svc, 100);
    assert!(!rig.buzzer.energised());
}
