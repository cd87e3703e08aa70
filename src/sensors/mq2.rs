//! MQ-2 smoke / combustible gas sensor.
//!
//! The module exposes two outputs: an analog voltage proportional to gas
//! concentration (read as a 12-bit ADC sample and reported as 0–100 %),
//! and a comparator output that goes LOW when the concentration exceeds
//! the on-board trimpot setting.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC2 and the DO pin via hw_init.
//! On host/test: reads from static atomics for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

const ADC_MAX: f32 = 4095.0;

#[cfg(not(target_os = "espidf"))]
static SIM_MQ2_RAW: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_MQ2_ALARM: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_mq2(raw: u16, digital_alarm: bool) {
    SIM_MQ2_RAW.store(raw, Ordering::Relaxed);
    SIM_MQ2_ALARM.store(digital_alarm, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
pub struct SmokeReading {
    pub raw: u16,
    pub percent: f32,
    pub digital_alarm: bool,
}

/// Linear map of a 12-bit sample onto 0–100 %.
pub fn raw_to_percent(raw: u16) -> f32 {
    (raw.min(4095) as f32 / ADC_MAX) * 100.0
}

pub struct Mq2Sensor {
    _ao_gpio: i32,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    do_gpio: i32,
    last_raw: u16,
}

impl Mq2Sensor {
    pub fn new(ao_gpio: i32, do_gpio: i32) -> Self {
        Self {
            _ao_gpio: ao_gpio,
            do_gpio,
            last_raw: 0,
        }
    }

    pub fn read(&mut self) -> SmokeReading {
        // A refused conversion keeps the previous sample; smoke is never NaN.
        if let Some(raw) = self.read_adc() {
            self.last_raw = raw;
        }
        SmokeReading {
            raw: self.last_raw,
            percent: raw_to_percent(self.last_raw),
            digital_alarm: self.read_alarm(),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        crate::drivers::hw_init::adc2_read(crate::pins::MQ2_ADC2_CHANNEL)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        Some(SIM_MQ2_RAW.load(Ordering::Relaxed))
    }

    /// Comparator output is active-LOW.
    #[cfg(target_os = "espidf")]
    fn read_alarm(&self) -> bool {
        !crate::drivers::hw_init::gpio_read(self.do_gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_alarm(&self) -> bool {
        SIM_MQ2_ALARM.load(Ordering::Relaxed)
    }
}
