//! Audible alarm controller.
//!
//! `On` is an alarm episode, not a steady output.  Inside an automatic
//! episode the output alternates: audible for `on_ms`, silent for
//! `off_ms`, repeating.  Each phase flip happens only after the current
//! phase's own duration has elapsed, so the pattern cannot run faster
//! than configured however often [`BuzzerController::tick`] is polled.
//!
//! An automatic episode is capped at `auto_off_ms`.  Past the cap the
//! buzzer is forced off and latched `timed_out`; the latch keeps fire
//! signals from re-arming it until the fire clears (sensor recovery or
//! the vision episode ending) or a new vision episode is confirmed.
//!
//! Manual `on` is a continuous tone with no cap.

use log::{info, warn};

use super::{ControlMode, FireAssessment, ManualAction, Override};
use crate::app::ports::Relay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuzzerState {
    #[default]
    Off,
    On,
}

impl BuzzerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepPattern {
    pub on_ms: u64,
    pub off_ms: u64,
    pub auto_off_ms: u64,
}

impl From<&crate::config::SystemConfig> for BeepPattern {
    fn from(c: &crate::config::SystemConfig) -> Self {
        Self {
            on_ms: c.buzzer_beep_on_ms as u64,
            off_ms: c.buzzer_beep_off_ms as u64,
            auto_off_ms: c.buzzer_auto_off_ms as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerSnapshot {
    pub state: BuzzerState,
    pub mode: ControlMode,
    /// Whether the output is audible right now (phase within an episode).
    pub sounding: bool,
    pub timed_out: bool,
    pub alarm_start_ms: u64,
    pub last_change_ms: u64,
}

pub struct BuzzerController<R: Relay> {
    relay: R,
    pattern: BeepPattern,
    state: BuzzerState,
    mode: ControlMode,
    output_on: bool,
    phase_since_ms: u64,
    alarm_start_ms: u64,
    last_change_ms: u64,
    timed_out: bool,
}

impl<R: Relay> BuzzerController<R> {
    pub fn new(mut relay: R, pattern: BeepPattern) -> Self {
        relay.drive(false);
        Self {
            relay,
            pattern,
            state: BuzzerState::Off,
            mode: ControlMode::Auto,
            output_on: false,
            phase_since_ms: 0,
            alarm_start_ms: 0,
            last_change_ms: 0,
            timed_out: false,
        }
    }

    // ── Automatic policy ──────────────────────────────────────

    /// Auto-mode evaluation of one valid reading.
    pub fn evaluate(&mut self, a: &FireAssessment, now_ms: u64) {
        if self.mode != ControlMode::Auto {
            return;
        }
        if a.fire() {
            if self.state == BuzzerState::Off && !self.timed_out {
                warn!("Buzzer: FIRE ({}), alarm on", a.reason.as_str());
                self.start(now_ms);
            }
        } else if a.recovery_allowed {
            self.clear_latch();
            if self.state == BuzzerState::On {
                info!("Buzzer: environment safe");
                self.silence(now_ms);
            }
        }
    }

    /// Polled every buzzer cycle: auto-off ceiling, then beep phase.
    pub fn tick(&mut self, now_ms: u64) {
        if self.state != BuzzerState::On || self.mode != ControlMode::Auto {
            return;
        }
        if now_ms.saturating_sub(self.alarm_start_ms) >= self.pattern.auto_off_ms {
            warn!("Buzzer: auto-off after {} ms", self.pattern.auto_off_ms);
            self.silence(now_ms);
            self.timed_out = true;
            return;
        }
        let phase_ms = if self.output_on {
            self.pattern.on_ms
        } else {
            self.pattern.off_ms
        };
        if now_ms.saturating_sub(self.phase_since_ms) >= phase_ms {
            self.output_on = !self.output_on;
            self.relay.drive(self.output_on);
            self.phase_since_ms = now_ms;
        }
    }

    /// A new vision episode just reached Confirmed.  That is fresh
    /// evidence of fire, so an auto-off latch left by an earlier episode
    /// no longer applies.
    pub fn arm_for_confirmed(&mut self, now_ms: u64) {
        if self.mode != ControlMode::Auto {
            return;
        }
        self.clear_latch();
        self.force_on(now_ms);
    }

    /// Vision-confirmed fire, re-driven on every token.  Honours the latch.
    pub fn force_on(&mut self, now_ms: u64) {
        if self.mode == ControlMode::Auto && self.state == BuzzerState::Off && !self.timed_out {
            warn!("Buzzer: vision fire, alarm on");
            self.start(now_ms);
        }
    }

    /// Vision episode ended.
    pub fn release(&mut self, now_ms: u64) {
        if self.mode != ControlMode::Auto {
            return;
        }
        self.clear_latch();
        if self.state == BuzzerState::On {
            info!("Buzzer: vision fire cleared");
            self.silence(now_ms);
        }
    }

    // ── Manual path ───────────────────────────────────────────

    /// Switching to manual while sounding silences immediately.
    pub fn set_mode(&mut self, mode: ControlMode, now_ms: u64) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        info!("Buzzer: mode {}", mode.as_str());
        if mode == ControlMode::Manual {
            self.silence(now_ms);
        }
        true
    }

    pub fn manual(&mut self, action: ManualAction, now_ms: u64) -> Override {
        if self.mode != ControlMode::Manual {
            return Override::IgnoredAuto;
        }
        let on = match action {
            ManualAction::On => true,
            ManualAction::Off => false,
            ManualAction::Toggle => self.state == BuzzerState::Off,
        };
        if on {
            self.start(now_ms);
        } else {
            self.silence(now_ms);
        }
        Override::Applied
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> BuzzerState {
        self.state
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn is_sounding(&self) -> bool {
        self.output_on
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn snapshot(&self) -> BuzzerSnapshot {
        BuzzerSnapshot {
            state: self.state,
            mode: self.mode,
            sounding: self.output_on,
            timed_out: self.timed_out,
            alarm_start_ms: self.alarm_start_ms,
            last_change_ms: self.last_change_ms,
        }
    }

    // ── Internals ─────────────────────────────────────────────

    /// Open an episode, audible phase first.  No-op if already On.
    fn start(&mut self, now_ms: u64) {
        if self.state == BuzzerState::On {
            return;
        }
        self.state = BuzzerState::On;
        self.alarm_start_ms = now_ms;
        self.phase_since_ms = now_ms;
        self.last_change_ms = now_ms;
        self.output_on = true;
        self.relay.drive(true);
        info!("Buzzer: ALARM ON");
    }

    /// Close the episode.  No-op if already Off.
    fn silence(&mut self, now_ms: u64) {
        if self.state == BuzzerState::Off {
            return;
        }
        if self.output_on {
            self.relay.drive(false);
        }
        self.state = BuzzerState::Off;
        self.output_on = false;
        self.last_change_ms = now_ms;
        info!("Buzzer: alarm off");
    }

    fn clear_latch(&mut self) {
        if self.timed_out {
            info!("Buzzer: auto-off latch cleared");
            self.timed_out = false;
        }
    }
}
