//! Unified error types for the fire-suppression firmware.
//!
//! A single `Error` enum that every subsystem can convert into.  None of
//! these are fatal: the core always degrades to the last known actuator
//! state and retries on the next cycle.  All variants are `Copy` so they can
//! be passed around and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor sample was unusable.
    Sensor(SensorError),
    /// The pump refused a spray request.
    Pump(PumpError),
    /// An inbound remote command was rejected.
    Command(CommandError),
    /// The vision stream framer discarded input.
    Vision(VisionError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Pump(e) => write!(f, "pump: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Vision(e) => write!(f, "vision: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Temperature or humidity acquisition returned not-a-number.
    NotANumber,
    /// DHT11 frame checksum did not match.
    Checksum,
    /// DHT11 did not answer within the protocol window.
    Timeout,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "reading is not a number"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::Timeout => write!(f, "sensor response timeout"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Pump errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpError {
    /// The pump is resting after a spray and may not be re-armed yet.
    CoolingDown { remaining_ms: u64 },
}

impl fmt::Display for PumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoolingDown { remaining_ms } => {
                write!(f, "cooling down, {remaining_ms} ms remaining")
            }
        }
    }
}

impl From<PumpError> for Error {
    fn from(e: PumpError) -> Self {
        Self::Pump(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Reasons an inbound payload is dropped.  Never reported to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Payload is not a JSON object with a string `action` field.
    Malformed,
    /// `action` is not valid for the endpoint it arrived on.
    UnknownAction,
    /// The transport delivered a topic this device does not subscribe to.
    UnknownTopic,
    /// Payload exceeds the inbox slot size.
    PayloadTooLarge,
    /// The command inbox is full; the newest command is dropped.
    InboxFull,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed payload"),
            Self::UnknownAction => write!(f, "unknown action"),
            Self::UnknownTopic => write!(f, "unknown topic"),
            Self::PayloadTooLarge => write!(f, "payload too large"),
            Self::InboxFull => write!(f, "inbox full"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Vision errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionError {
    /// A line exceeded the framing buffer and was discarded.
    LineOverflow,
}

impl fmt::Display for VisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineOverflow => write!(f, "line overflow, partial line discarded"),
        }
    }
}

impl From<VisionError> for Error {
    fn from(e: VisionError) -> Self {
        Self::Vision(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
