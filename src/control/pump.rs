//! Water pump controller — the duty-cycle-protected actuator.
//!
//! ```text
//!        spray(d)               deadline reached / stop()
//!   Off ─────────▶ On ──────────────────────────────────▶ Cooldown
//!    ▲                                                       │
//!    └──────────────── cooldown interval elapsed ────────────┘
//! ```
//!
//! ## Safety contract
//!
//! - A single run never exceeds `max_on_ms`, whatever asked for it and
//!   however often the request is repeated.
//! - Cooldown always follows a run and always lasts `cooldown_ms`; there is
//!   no edge from Cooldown back to On.
//! - The automatic policy never stops the pump.  A burst runs to its
//!   deadline even if the reading dips below the safe thresholds.

use log::{info, warn};

use super::{ControlMode, FireAssessment, ManualAction, Override};
use crate::app::ports::Relay;
use crate::error::PumpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpState {
    #[default]
    Off,
    On,
    Cooldown,
}

impl PumpState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Cooldown => "cooldown",
        }
    }
}

/// Durations the pump is parameterised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpTiming {
    pub max_on_ms: u64,
    pub cooldown_ms: u64,
    pub auto_spray_ms: u64,
}

impl From<&crate::config::SystemConfig> for PumpTiming {
    fn from(c: &crate::config::SystemConfig) -> Self {
        Self {
            max_on_ms: c.pump_max_on_ms as u64,
            cooldown_ms: c.pump_cooldown_ms as u64,
            auto_spray_ms: c.pump_auto_spray_ms as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpSnapshot {
    pub state: PumpState,
    pub mode: ControlMode,
    pub spray_count: u32,
    pub total_spray_ms: u64,
    pub cooldown_remaining_ms: u64,
    pub last_change_ms: u64,
}

pub struct PumpController<R: Relay> {
    relay: R,
    timing: PumpTiming,
    state: PumpState,
    mode: ControlMode,
    started_ms: u64,
    /// Auto-stop deadline, armed only while On.
    deadline_ms: Option<u64>,
    stopped_ms: u64,
    spray_count: u32,
    total_spray_ms: u64,
    last_change_ms: u64,
}

impl<R: Relay> PumpController<R> {
    pub fn new(mut relay: R, timing: PumpTiming) -> Self {
        relay.drive(false);
        Self {
            relay,
            timing,
            state: PumpState::Off,
            mode: ControlMode::Auto,
            started_ms: 0,
            deadline_ms: None,
            stopped_ms: 0,
            spray_count: 0,
            total_spray_ms: 0,
            last_change_ms: 0,
        }
    }

    // ── Core transitions ──────────────────────────────────────

    /// Start (or extend) a burst of `duration_ms`, clamped to `max_on_ms`.
    ///
    /// While On, the deadline moves to `now + duration` but never past
    /// `started + max_on_ms`.  Rejected while the cooldown is running.
    pub fn spray(&mut self, duration_ms: u64, now_ms: u64) -> Result<(), PumpError> {
        // Settle any deadline that has already passed first, so a late
        // request can neither extend an expired run nor be refused by an
        // expired cooldown.
        self.tick(now_ms);

        let duration_ms = duration_ms.min(self.timing.max_on_ms);
        match self.state {
            PumpState::Cooldown => {
                let remaining_ms = self.remaining_cooldown(now_ms);
                warn!("Pump: spray refused, cooling down ({} ms left)", remaining_ms);
                Err(PumpError::CoolingDown { remaining_ms })
            }
            PumpState::Off => {
                if duration_ms == 0 {
                    return Ok(());
                }
                self.relay.drive(true);
                self.state = PumpState::On;
                self.started_ms = now_ms;
                self.last_change_ms = now_ms;
                self.deadline_ms = Some(now_ms + duration_ms);
                self.spray_count = self.spray_count.saturating_add(1);
                info!("Pump: ON, spray #{} for {:.1}s", self.spray_count, duration_ms as f32 / 1000.0);
                Ok(())
            }
            PumpState::On => {
                let cap = self.started_ms + self.timing.max_on_ms;
                let deadline = (now_ms + duration_ms).min(cap);
                self.deadline_ms = Some(deadline);
                info!("Pump: spray extended, stops in {} ms", deadline.saturating_sub(now_ms));
                Ok(())
            }
        }
    }

    /// Stop a running burst and enter Cooldown.  No-op unless On.
    pub fn stop(&mut self, now_ms: u64) {
        if self.state != PumpState::On {
            return;
        }
        self.relay.drive(false);
        let ran_ms = now_ms.saturating_sub(self.started_ms);
        self.total_spray_ms = self.total_spray_ms.saturating_add(ran_ms);
        self.state = PumpState::Cooldown;
        self.stopped_ms = now_ms;
        self.last_change_ms = now_ms;
        self.deadline_ms = None;
        info!("Pump: OFF after {} ms, cooling down {} ms", ran_ms, self.timing.cooldown_ms);
    }

    /// Polled every pump cycle: auto-stop, then cooldown expiry.
    pub fn tick(&mut self, now_ms: u64) {
        if let (PumpState::On, Some(deadline)) = (self.state, self.deadline_ms) {
            if now_ms >= deadline {
                self.stop(now_ms);
            }
        }
        if self.state == PumpState::Cooldown
            && now_ms.saturating_sub(self.stopped_ms) >= self.timing.cooldown_ms
        {
            self.state = PumpState::Off;
            self.last_change_ms = now_ms;
            info!("Pump: cooldown complete, ready");
        }
    }

    // ── Automatic policy ──────────────────────────────────────

    /// Auto-mode evaluation of one valid reading.  Starts a burst on fire
    /// when the pump is idle; never stops one.
    pub fn evaluate(&mut self, a: &FireAssessment, now_ms: u64) {
        if self.mode != ControlMode::Auto || !a.fire() {
            return;
        }
        self.tick(now_ms);
        if self.state == PumpState::Off {
            info!("Pump: fire ({}), spraying", a.reason.as_str());
            let _ = self.spray(self.timing.auto_spray_ms, now_ms);
        }
    }

    /// Vision-confirmed fire: spray if auto and available.
    pub fn force_spray(&mut self, duration_ms: u64, now_ms: u64) {
        if self.mode != ControlMode::Auto {
            return;
        }
        self.tick(now_ms);
        if self.state == PumpState::Off {
            info!("Pump: vision fire, spraying");
            let _ = self.spray(duration_ms, now_ms);
        }
    }

    // ── Manual path ───────────────────────────────────────────

    pub fn set_mode(&mut self, mode: ControlMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        info!("Pump: mode {}", mode.as_str());
        true
    }

    /// `On` sprays for `spray_ms` (clamped); `Off` stops into Cooldown.
    pub fn manual(&mut self, action: ManualAction, spray_ms: u64, now_ms: u64) -> Result<Override, PumpError> {
        if self.mode != ControlMode::Manual {
            return Ok(Override::IgnoredAuto);
        }
        self.tick(now_ms);
        let on = match action {
            ManualAction::On => true,
            ManualAction::Off => false,
            ManualAction::Toggle => self.state != PumpState::On,
        };
        if on {
            self.spray(spray_ms, now_ms)?;
        } else {
            self.stop(now_ms);
        }
        Ok(Override::Applied)
    }

    // ── Queries ───────────────────────────────────────────────

    /// `true` unless the pump is in Cooldown.
    pub fn is_available(&self) -> bool {
        self.state != PumpState::Cooldown
    }

    /// Time left before Off eligibility; 0 outside Cooldown.
    pub fn remaining_cooldown(&self, now_ms: u64) -> u64 {
        if self.state != PumpState::Cooldown {
            return 0;
        }
        self.timing
            .cooldown_ms
            .saturating_sub(now_ms.saturating_sub(self.stopped_ms))
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn started_ms(&self) -> u64 {
        self.started_ms
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn snapshot(&self, now_ms: u64) -> PumpSnapshot {
        PumpSnapshot {
            state: self.state,
            mode: self.mode,
            spray_count: self.spray_count,
            total_spray_ms: self.total_spray_ms,
            cooldown_remaining_ms: self.remaining_cooldown(now_ms),
            last_change_ms: self.last_change_ms,
        }
    }
}
