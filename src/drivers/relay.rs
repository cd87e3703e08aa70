//! Relay and buzzer output driver.
//!
//! Wraps any `embedded-hal` output pin and maps "energised" onto the pin's
//! electrical level.  The fan and pump relay boards switch on HIGH; the
//! buzzer module sounds on LOW.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the pin is an `esp-idf-hal` `PinDriver`.  On host/test any
//! `OutputPin` works, so the controllers run against an in-memory pin.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::Relay;

/// Electrical level that energises the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    High,
    Low,
}

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    active: ActiveLevel,
    label: &'static str,
    energised: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take the pin and park it de-energised.
    pub fn new(pin: P, active: ActiveLevel, label: &'static str) -> Self {
        let mut relay = Self {
            pin,
            active,
            label,
            energised: false,
        };
        relay.write(false);
        relay
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn write(&mut self, energised: bool) {
        let high = match self.active {
            ActiveLevel::High => energised,
            ActiveLevel::Low => !energised,
        };
        let res = if high { self.pin.set_high() } else { self.pin.set_low() };
        match res {
            Ok(()) => self.energised = energised,
            Err(e) => warn!("Relay: {} write failed: {:?}", self.label, e),
        }
    }
}

impl<P: OutputPin + Send> Relay for RelayDriver<P> {
    fn drive(&mut self, energised: bool) {
        self.write(energised);
    }
}
