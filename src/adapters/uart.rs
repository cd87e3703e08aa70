//! Vision co-processor serial link.
//!
//! The co-processor prints one word per line (`fire` when it sees flame).
//! This adapter only moves bytes; framing happens in the service.
//!
//! - **`target_os = "espidf"`**: UART1 at 115200 8N1, non-blocking reads.
//! - **all other targets**: an in-memory queue the host can feed.

use crate::app::ports::ByteSource;

#[cfg(target_os = "espidf")]
pub struct VisionUart {
    uart: esp_idf_svc::hal::uart::UartDriver<'static>,
}

#[cfg(target_os = "espidf")]
impl VisionUart {
    pub fn new(
        uart: esp_idf_svc::hal::uart::UART1,
        tx: esp_idf_svc::hal::gpio::AnyIOPin,
        rx: esp_idf_svc::hal::gpio::AnyIOPin,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        use esp_idf_svc::hal::gpio::AnyIOPin;
        use esp_idf_svc::hal::uart::{config::Config, UartDriver};
        use esp_idf_svc::hal::units::Hertz;

        let config = Config::default().baudrate(Hertz(crate::pins::VISION_UART_BAUD));
        let uart = UartDriver::new(uart, tx, rx, Option::<AnyIOPin>::None, Option::<AnyIOPin>::None, &config)?;
        log::info!("Vision: UART1 up at {} baud", crate::pins::VISION_UART_BAUD);
        Ok(Self { uart })
    }
}

#[cfg(target_os = "espidf")]
impl ByteSource for VisionUart {
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        match self.uart.read(buf, esp_idf_svc::hal::delay::NON_BLOCK) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("Vision: UART read failed: {}", e);
                0
            }
        }
    }
}

/// Simulation: bytes queued by [`VisionUart::inject`].
#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
pub struct VisionUart {
    rx: std::collections::VecDeque<u8>,
}

#[cfg(not(target_os = "espidf"))]
impl VisionUart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }
}

#[cfg(not(target_os = "espidf"))]
impl ByteSource for VisionUart {
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.rx.len());
        for (slot, b) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = b;
        }
        n
    }
}
