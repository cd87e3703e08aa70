//! Hardware adapter — the sensor hub behind [`SensorPort`].
//!
//! Actuators are not here: each relay is handed to its controller at
//! construction.  On non-espidf targets the hub's drivers read their
//! simulation statics.

use crate::app::ports::SensorPort;
use crate::sensors::{SensorHub, SensorReading};

pub struct HardwareAdapter {
    hub: SensorHub,
}

impl HardwareAdapter {
    pub fn new(hub: SensorHub) -> Self {
        Self { hub }
    }
}

impl SensorPort for HardwareAdapter {
    fn sample(&mut self) -> SensorReading {
        self.hub.read_all()
    }
}
