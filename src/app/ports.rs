//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SuppressionService (domain)
//! ```
//!
//! Driven adapters (sensor hub, relay pins, vision UART, telemetry
//! transport, clock) implement these traits.  The
//! [`SuppressionService`](super::service::SuppressionService) consumes them
//! via generics, so the domain core never touches hardware directly.

use super::events::TelemetryRecord;
use crate::sensors::SensorReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one complete environmental sample per call.
///
/// Failed temperature/humidity acquisition is reported in-band as NaN
/// (an invalid reading), never as zero.
pub trait SensorPort {
    fn sample(&mut self) -> SensorReading;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One switched output.  `energised = true` means the load is running,
/// whatever the electrical polarity of the pin behind it.
///
/// Each relay has exactly one owner (its controller), so writes are never
/// interleaved.
pub trait Relay: Send {
    fn drive(&mut self, energised: bool);
}

// ───────────────────────────────────────────────────────────────
// Vision byte source (driven adapter: serial → domain)
// ───────────────────────────────────────────────────────────────

/// Non-blocking byte stream from the vision co-processor.
pub trait ByteSource {
    /// Copy whatever is pending into `buf`.  Returns 0 when nothing is
    /// waiting or the link is down.
    fn read_available(&mut self, buf: &mut [u8]) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Telemetry sink (driven adapter: domain → transport)
// ───────────────────────────────────────────────────────────────

/// Best-effort outbound status.  Implementations must not block on a
/// dead link; the core never retries.
pub trait TelemetrySink {
    fn publish(&mut self, record: &TelemetryRecord);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.  Every deadline in the core is
/// compared against this.
pub trait Clock {
    fn now_ms(&self) -> u64;
}
