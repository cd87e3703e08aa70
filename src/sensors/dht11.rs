//! DHT11 temperature / humidity sensor (single-wire, bit-banged).
//!
//! Protocol: host pulls the line low ≥18 ms, releases it; the sensor
//! answers with an 80 µs low / 80 µs high preamble followed by 40 data
//! bits.  Each bit is a ~50 µs low gap then a high pulse whose length
//! encodes the value (~27 µs = 0, ~70 µs = 1).  Frame layout:
//! `[hum_int, hum_dec, temp_int, temp_dec, checksum]`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the open-drain GPIO configured by hw_init.
//! On host/test: reads from static atomics for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::SensorError;

/// Humidity and temperature from one successful transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhtData {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41C8_0000); // 25.0
#[cfg(not(target_os = "espidf"))]
static SIM_HUM_BITS: AtomicU32 = AtomicU32::new(0x4220_0000); // 40.0

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_dht(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUM_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

/// Make the next simulated read fail as a timed-out transaction.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_dht() {
    SIM_TEMP_BITS.store(f32::NAN.to_bits(), Ordering::Relaxed);
    SIM_HUM_BITS.store(f32::NAN.to_bits(), Ordering::Relaxed);
}

/// Decode and checksum a raw 5-byte frame.
pub fn decode_frame(frame: &[u8; 5]) -> Result<DhtData, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }
    // DHT11 decimal bytes are tenths; bit 7 of temp_dec flags sub-zero.
    let humidity_pct = frame[0] as f32 + frame[1] as f32 * 0.1;
    let mut temperature_c = frame[2] as f32 + (frame[3] & 0x7F) as f32 * 0.1;
    if frame[3] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }
    Ok(DhtData {
        temperature_c,
        humidity_pct,
    })
}

pub struct Dht11Sensor {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl Dht11Sensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn read(&mut self) -> Result<DhtData, SensorError> {
        let data = self.acquire()?;
        if data.temperature_c.is_nan() || data.humidity_pct.is_nan() {
            return Err(SensorError::NotANumber);
        }
        Ok(data)
    }

    #[cfg(not(target_os = "espidf"))]
    fn acquire(&mut self) -> Result<DhtData, SensorError> {
        Ok(DhtData {
            temperature_c: f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(SIM_HUM_BITS.load(Ordering::Relaxed)),
        })
    }

    #[cfg(target_os = "espidf")]
    fn acquire(&mut self) -> Result<DhtData, SensorError> {
        use crate::drivers::hw_init::gpio_write;

        // Start signal: the 20 ms low is long enough to yield the CPU.
        gpio_write(self.gpio, false);
        std::thread::sleep(std::time::Duration::from_millis(20));

        // Bit timing is too tight to survive a context switch.
        let frame = esp_idf_svc::hal::interrupt::free(|| self.read_frame())?;
        decode_frame(&frame)
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&self) -> Result<[u8; 5], SensorError> {
        use crate::drivers::hw_init::{delay_us, gpio_write};

        gpio_write(self.gpio, true);
        delay_us(30);

        // Preamble: low, high, then the first bit's low gap.
        self.wait_while(false, 100)?;
        self.wait_while(true, 100)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_while(false, 80)?;
            let high_us = self.wait_while(true, 100)?;
            if high_us > 40 {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Spin while the line sits at `level`; returns how long that took.
    #[cfg(target_os = "espidf")]
    fn wait_while(&self, level: bool, timeout_us: u64) -> Result<u64, SensorError> {
        use crate::drivers::hw_init::{gpio_read, micros};

        let start = micros();
        while gpio_read(self.gpio) == level {
            if micros() - start > timeout_us {
                return Err(SensorError::Timeout);
            }
        }
        Ok(micros() - start)
    }
}
