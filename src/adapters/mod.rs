//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements      | Connects to                  |
//! |-------------|-----------------|------------------------------|
//! | `hardware`  | SensorPort      | DHT11 + MQ-2 sensor hub      |
//! | `uart`      | ByteSource      | Vision co-processor (UART1)  |
//! | `mqtt`      | TelemetrySink   | ESP-IDF MQTT client          |
//! |             | (command feed)  | CommandGateway inbox         |
//! | `log_sink`  | TelemetrySink   | Serial log output            |
//! | `time`      | Clock           | ESP32 system timer           |
//! | `device_id` | —               | eFuse factory MAC            |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod uart;
