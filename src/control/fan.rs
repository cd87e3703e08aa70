//! Exhaust fan controller.
//!
//! Two states plus the reason the fan is running.  In auto mode the fan
//! follows [`FireAssessment`]: any alarm reason turns it on, and it only
//! turns off again once recovery is allowed.  Between the two it holds.

use log::info;

use super::{AlarmReason, ControlMode, FireAssessment, ManualAction, Override};
use crate::app::ports::Relay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanState {
    #[default]
    Off,
    On,
}

impl FanState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanSnapshot {
    pub state: FanState,
    pub mode: ControlMode,
    pub reason: AlarmReason,
    pub last_change_ms: u64,
}

pub struct FanController<R: Relay> {
    relay: R,
    state: FanState,
    mode: ControlMode,
    reason: AlarmReason,
    last_change_ms: u64,
}

impl<R: Relay> FanController<R> {
    /// Starts Off in auto mode and drives the relay to match.
    pub fn new(mut relay: R) -> Self {
        relay.drive(false);
        Self {
            relay,
            state: FanState::Off,
            mode: ControlMode::Auto,
            reason: AlarmReason::None,
            last_change_ms: 0,
        }
    }

    // ── Automatic policy ──────────────────────────────────────

    /// Auto-mode evaluation of one valid reading.
    pub fn evaluate(&mut self, a: &FireAssessment, now_ms: u64) {
        if self.mode != ControlMode::Auto {
            return;
        }
        if a.fire() {
            if self.reason != a.reason {
                info!("Fan: alarm reason {}", a.reason.as_str());
            }
            self.reason = a.reason;
            self.switch(FanState::On, now_ms);
        } else if a.recovery_allowed && self.state == FanState::On {
            info!("Fan: environment safe");
            self.reason = AlarmReason::None;
            self.switch(FanState::Off, now_ms);
        }
    }

    /// Vision-confirmed fire: run the fan for smoke extraction.
    pub fn force_on(&mut self, now_ms: u64) {
        if self.mode == ControlMode::Auto && self.state != FanState::On {
            info!("Fan: vision fire, extracting smoke");
            self.reason = AlarmReason::Both;
            self.switch(FanState::On, now_ms);
        }
    }

    /// Vision episode ended: stand down if auto and running.
    pub fn release(&mut self, now_ms: u64) {
        if self.mode == ControlMode::Auto && self.state == FanState::On {
            info!("Fan: vision fire cleared");
            self.reason = AlarmReason::None;
            self.switch(FanState::Off, now_ms);
        }
    }

    // ── Manual path ───────────────────────────────────────────

    pub fn set_mode(&mut self, mode: ControlMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        info!("Fan: mode {}", mode.as_str());
        true
    }

    pub fn manual(&mut self, action: ManualAction, now_ms: u64) -> Override {
        if self.mode != ControlMode::Manual {
            return Override::IgnoredAuto;
        }
        let target = match action {
            ManualAction::On => FanState::On,
            ManualAction::Off => FanState::Off,
            ManualAction::Toggle => match self.state {
                FanState::On => FanState::Off,
                FanState::Off => FanState::On,
            },
        };
        if target == FanState::Off {
            self.reason = AlarmReason::None;
        }
        self.switch(target, now_ms);
        Override::Applied
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> FanState {
        self.state
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn reason(&self) -> AlarmReason {
        self.reason
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn snapshot(&self) -> FanSnapshot {
        FanSnapshot {
            state: self.state,
            mode: self.mode,
            reason: self.reason,
            last_change_ms: self.last_change_ms,
        }
    }

    /// Idempotent: no relay write or log when already in `target`.
    fn switch(&mut self, target: FanState, now_ms: u64) {
        if self.state == target {
            return;
        }
        self.relay.drive(target == FanState::On);
        self.state = target;
        self.last_change_ms = now_ms;
        info!("Fan: {}", target.as_str().to_uppercase());
    }
}
