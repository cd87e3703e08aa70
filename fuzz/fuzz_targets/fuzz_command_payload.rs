//! Fuzz target: `parse_command`
//!
//! Feeds arbitrary payloads to every command endpoint.  Parsing must never
//! panic, and anything accepted must be a command for the endpoint's own
//! actuator.
//!
//! cargo fuzz run fuzz_command_payload

#![no_main]

use firesuppress::app::commands::{parse_command, Actuator, Command, Endpoint};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for actuator in [Actuator::Fan, Actuator::Pump, Actuator::Buzzer] {
        for endpoint in [Endpoint::action(actuator), Endpoint::mode(actuator)] {
            if let Ok(cmd) = parse_command(endpoint, data) {
                let target = match cmd {
                    Command::SetMode(a, _) | Command::Switch(a, _) => a,
                };
                assert_eq!(target, actuator);
            }
        }
    }
});
