//! Application core — the decision layer, no I/O of its own.
//!
//! Everything that decides when a fan, pump, or buzzer runs lives behind
//! [`service::SuppressionService`].  Hardware and transports reach it only
//! through the **port traits** in [`ports`], so the whole layer runs on the
//! host under test with mock adapters.

pub mod commands;
pub mod events;
pub mod gateway;
pub mod ports;
pub mod service;
