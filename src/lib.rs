//! FireSuppress firmware library.
//!
//! Exposes the sensing, vision, and actuator-control logic for
//! integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module and has an
//! in-memory twin on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod pins;
pub mod sync;
pub mod vision;

pub mod adapters;
pub mod drivers;
pub mod sensors;
