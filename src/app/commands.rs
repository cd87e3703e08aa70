//! Inbound commands to the application service.
//!
//! The remote side addresses six endpoints (an action and a mode endpoint
//! per actuator) with a JSON payload `{"action": "<verb>"}`.  Parsing
//! turns an endpoint plus payload into a typed [`Command`]; anything that
//! does not fit is a [`CommandError`] and gets dropped without a reply.

use serde_json::{Map, Value};

use crate::control::{ControlMode, ManualAction};
use crate::error::{CommandError, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    Fan,
    Pump,
    Buzzer,
}

impl Actuator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Pump => "pump",
            Self::Buzzer => "buzzer",
        }
    }
}

/// Which of an actuator's two endpoints a payload arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// `on` / `off` / `toggle`, honoured only in manual mode.
    Action,
    /// `auto` / `manual`, always honoured.
    Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub actuator: Actuator,
    pub kind: EndpointKind,
}

impl Endpoint {
    pub const fn action(actuator: Actuator) -> Self {
        Self {
            actuator,
            kind: EndpointKind::Action,
        }
    }

    pub const fn mode(actuator: Actuator) -> Self {
        Self {
            actuator,
            kind: EndpointKind::Mode,
        }
    }
}

/// Commands that the gateway forwards into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetMode(Actuator, ControlMode),
    Switch(Actuator, ManualAction),
}

/// How the core disposed of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Action arrived while the actuator was in auto mode.
    IgnoredAutoMode,
    /// The controller refused (pump cooling down).
    Rejected(Error),
}

/// Longest verb is `manual`; anything longer is not a verb.
const MAX_VERB_LEN: usize = 16;

/// The `action` string of a payload.  Only a JSON object qualifies: a
/// derived struct would also accept `["on"]` by position.
fn action_field(payload: &[u8]) -> Result<heapless::String<MAX_VERB_LEN>, CommandError> {
    let doc: Map<String, Value> = serde_json::from_slice(payload).map_err(|_| CommandError::Malformed)?;
    let action = doc.get("action").and_then(Value::as_str).ok_or(CommandError::Malformed)?;
    heapless::String::try_from(action).map_err(|_| CommandError::Malformed)
}

/// Parse a raw payload received on `endpoint`.
pub fn parse_command(endpoint: Endpoint, payload: &[u8]) -> Result<Command, CommandError> {
    let action = action_field(payload)?;
    let verb = action.as_str();
    let actuator = endpoint.actuator;
    match endpoint.kind {
        EndpointKind::Mode => match verb {
            "auto" => Ok(Command::SetMode(actuator, ControlMode::Auto)),
            "manual" => Ok(Command::SetMode(actuator, ControlMode::Manual)),
            _ => Err(CommandError::UnknownAction),
        },
        EndpointKind::Action => match verb {
            "on" => Ok(Command::Switch(actuator, ManualAction::On)),
            "off" => Ok(Command::Switch(actuator, ManualAction::Off)),
            "toggle" => Ok(Command::Switch(actuator, ManualAction::Toggle)),
            _ => Err(CommandError::UnknownAction),
        },
    }
}
