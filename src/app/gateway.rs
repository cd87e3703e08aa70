//! Command gateway — the only path by which the outside world changes
//! actuator state.
//!
//! The transport callback runs on the transport's own task and must not
//! touch controller locks, so it only copies the raw payload into a
//! bounded `embassy-sync` channel.  The command loop drains that channel,
//! parses each payload, and applies it to the service.
//!
//! ```text
//! ┌──────────────┐  InboundCommand  ┌──────────────┐
//! │  Transport   │────────────────▶│ Command loop  │──▶ SuppressionService
//! │  callback    │   (drop if full) │  (drain)      │
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::{debug, info, warn};

use super::commands::{parse_command, CommandOutcome, Endpoint};
use super::ports::Relay;
use super::service::SuppressionService;
use crate::error::CommandError;

/// Largest payload accepted.  `{"action":"manual"}` is 19 bytes.
pub const MAX_PAYLOAD: usize = 128;

/// Commands waiting for the command loop.
const INBOX_DEPTH: usize = 8;

/// Raw payload as it came off the transport.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub endpoint: Endpoint,
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

pub struct CommandGateway {
    inbox: Channel<CriticalSectionRawMutex, InboundCommand, INBOX_DEPTH>,
}

impl CommandGateway {
    pub const fn new() -> Self {
        Self {
            inbox: Channel::new(),
        }
    }

    /// Queue a payload from the transport.  Never blocks; a full inbox or
    /// an oversize payload drops the command.
    pub fn submit(&self, endpoint: Endpoint, payload: &[u8]) -> Result<(), CommandError> {
        let payload = Vec::from_slice(payload).map_err(|()| {
            warn!("Gateway: {} payload too large ({} bytes), dropped", endpoint.actuator.as_str(), payload.len());
            CommandError::PayloadTooLarge
        })?;
        self.inbox
            .try_send(InboundCommand { endpoint, payload })
            .map_err(|_| {
                warn!("Gateway: inbox full, command dropped");
                CommandError::InboxFull
            })
    }

    /// Parse and apply one payload.  Malformed input is dropped quietly.
    pub fn dispatch<F: Relay, P: Relay, B: Relay>(
        &self,
        service: &SuppressionService<F, P, B>,
        endpoint: Endpoint,
        payload: &[u8],
        now_ms: u64,
    ) -> Result<CommandOutcome, CommandError> {
        let cmd = parse_command(endpoint, payload).inspect_err(|e| {
            debug!("Gateway: {} {:?} dropped ({})", endpoint.actuator.as_str(), endpoint.kind, e);
        })?;
        let outcome = service.apply(cmd, now_ms);
        match outcome {
            CommandOutcome::Applied => info!("Gateway: {:?} applied", cmd),
            CommandOutcome::IgnoredAutoMode => {
                info!("Gateway: {} action ignored, auto mode", endpoint.actuator.as_str());
            }
            CommandOutcome::Rejected(e) => warn!("Gateway: {:?} rejected: {}", cmd, e),
        }
        Ok(outcome)
    }

    /// Drain everything queued.  Returns how many commands were applied.
    pub fn process<F: Relay, P: Relay, B: Relay>(
        &self,
        service: &SuppressionService<F, P, B>,
        now_ms: u64,
    ) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.inbox.try_receive() {
            if let Ok(CommandOutcome::Applied) = self.dispatch(service, msg.endpoint, &msg.payload, now_ms) {
                applied += 1;
            }
        }
        applied
    }

    /// Commands currently waiting.
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl Default for CommandGateway {
    fn default() -> Self {
        Self::new()
    }
}
