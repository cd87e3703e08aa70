//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below exercises one slice of the system against the mock
//! adapters in [`mock_hw`].  Everything runs on the host with a manual
//! clock; no test sleeps.

mod gateway_tests;
mod mock_hw;
mod service_tests;
mod vision_tests;
