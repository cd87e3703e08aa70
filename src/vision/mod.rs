//! Vision-channel fire confidence.
//!
//! The vision co-processor sends a `fire` line for every frame in which
//! it sees flame.  [`VisionFireMonitor`] turns that stream into a
//! three-level confidence with a confirm count on the way up and a
//! silence timeout on the way down.
//!
//! ```text
//!            token               count >= confirm
//!   None ──────────▶ Detected ──────────────────▶ Confirmed
//!    ▲                  │                             │
//!    └──────────────────┴─── now - last > timeout ────┘
//! ```
//!
//! The monitor only tracks state.  Driving actuators on confirmation and
//! releasing them on reset is the service's job, done after the monitor's
//! lock is released.

pub mod framer;

use log::{info, warn};
use serde::Serialize;

/// Ordered by strength: `None < Detected < Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FireConfidence {
    #[default]
    None,
    Detected,
    Confirmed,
}

impl FireConfidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Detected => "detected",
            Self::Confirmed => "confirmed",
        }
    }
}

/// Result of a silence-timeout reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeEnd {
    /// Suppression had been activated during the episode, so the
    /// actuators it forced on must be released.
    pub was_suppressing: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisionSnapshot {
    pub confidence: FireConfidence,
    pub fire_event_count: u32,
    pub total_fire_events: u32,
    pub suppression_active: bool,
    pub last_fire_ms: u64,
}

#[derive(Debug)]
pub struct VisionFireMonitor {
    confirm_count: u32,
    timeout_ms: u64,
    confidence: FireConfidence,
    last_fire_ms: u64,
    fire_start_ms: u64,
    /// Tokens seen in the current episode.
    fire_event_count: u32,
    /// Episodes since boot.
    total_fire_events: u32,
    suppression_active: bool,
}

impl VisionFireMonitor {
    pub fn new(confirm_count: u32, timeout_ms: u32) -> Self {
        Self {
            confirm_count: confirm_count.max(1),
            timeout_ms: timeout_ms as u64,
            confidence: FireConfidence::None,
            last_fire_ms: 0,
            fire_start_ms: 0,
            fire_event_count: 0,
            total_fire_events: 0,
            suppression_active: false,
        }
    }

    /// Record one flame token.  Returns the confidence after the update.
    pub fn on_fire_signal(&mut self, now_ms: u64) -> FireConfidence {
        self.last_fire_ms = now_ms;
        self.fire_event_count = self.fire_event_count.saturating_add(1);

        if self.confidence == FireConfidence::None {
            self.confidence = FireConfidence::Detected;
            self.fire_start_ms = now_ms;
            self.total_fire_events = self.total_fire_events.saturating_add(1);
            warn!("Vision: FIRE DETECTED (event #{})", self.total_fire_events);
        }

        if self.confidence == FireConfidence::Detected && self.fire_event_count >= self.confirm_count {
            self.confidence = FireConfidence::Confirmed;
            self.suppression_active = true;
            warn!("Vision: fire confirmed after {} token(s), suppression active", self.fire_event_count);
        }

        self.confidence
    }

    /// Polled every vision cycle.  Ends the episode once no token has
    /// arrived for longer than the timeout.
    pub fn check_timeout(&mut self, now_ms: u64) -> Option<EpisodeEnd> {
        if self.confidence == FireConfidence::None {
            return None;
        }
        if now_ms.saturating_sub(self.last_fire_ms) > self.timeout_ms {
            info!("Vision: fire signal timeout");
            return self.reset(now_ms);
        }
        None
    }

    /// Clear the episode.  `None` if there was nothing to clear.
    pub fn reset(&mut self, now_ms: u64) -> Option<EpisodeEnd> {
        if self.confidence == FireConfidence::None {
            return None;
        }
        let end = EpisodeEnd {
            was_suppressing: self.suppression_active,
            duration_ms: now_ms.saturating_sub(self.fire_start_ms),
        };
        info!("Vision: fire episode ended after {:.1}s", end.duration_ms as f32 / 1000.0);
        self.confidence = FireConfidence::None;
        self.fire_event_count = 0;
        self.suppression_active = false;
        Some(end)
    }

    pub fn confidence(&self) -> FireConfidence {
        self.confidence
    }

    pub fn is_confirmed(&self) -> bool {
        self.confidence == FireConfidence::Confirmed
    }

    pub fn snapshot(&self) -> VisionSnapshot {
        VisionSnapshot {
            confidence: self.confidence,
            fire_event_count: self.fire_event_count,
            total_fire_events: self.total_fire_events,
            suppression_active: self.suppression_active,
            last_fire_ms: self.last_fire_ms,
        }
    }
}
