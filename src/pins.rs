//! GPIO / peripheral pin assignments for the fire-suppression controller board.
//!
//! Single source of truth for raw pin numbers.  The relay outputs are
//! claimed as typed `esp-idf-hal` pins in `main`; the numbers below must
//! stay in step with those.

// ---------------------------------------------------------------------------
// Actuator relays
// ---------------------------------------------------------------------------

/// Exhaust fan relay.  HIGH = energised.
pub const FAN_RELAY_GPIO: i32 = 13;
/// Water pump relay.  HIGH = energised.
pub const PUMP_RELAY_GPIO: i32 = 14;
/// Active buzzer module.  LOW = sounding.
pub const BUZZER_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT11 single-wire temperature / humidity sensor.
pub const DHT11_GPIO: i32 = 9;

/// MQ-2 smoke sensor analog output.  ADC2 channel 4 (GPIO 15 on ESP32-S3).
pub const MQ2_AO_GPIO: i32 = 15;
pub const MQ2_ADC2_CHANNEL: u32 = 4;

/// MQ-2 comparator output.  LOW = concentration above the on-board trimpot.
pub const MQ2_DO_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Vision co-processor link (UART1)
// ---------------------------------------------------------------------------

pub const VISION_UART_RX_GPIO: i32 = 18;
pub const VISION_UART_TX_GPIO: i32 = 17;
pub const VISION_UART_BAUD: u32 = 115_200;
