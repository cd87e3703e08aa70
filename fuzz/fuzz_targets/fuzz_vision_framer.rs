//! Fuzz target: `LineFramer::push`
//!
//! Streams arbitrary serial bytes through the vision line framer and
//! checks every completed line is non-empty, terminator-free, and within
//! the buffer bound.
//!
//! cargo fuzz run fuzz_vision_framer

#![no_main]

use firesuppress::vision::framer::{is_fire_token, LineFramer, MAX_LINE_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut framer = LineFramer::new();
    for &b in data {
        if let Ok(Some(line)) = framer.push(b) {
            assert!(!line.is_empty());
            assert!(line.len() <= MAX_LINE_LEN);
            assert!(!line.iter().any(|&c| c == b'\n' || c == b'\r'));
            let _ = is_fire_token(&line);
        }
        assert!(framer.pending() <= MAX_LINE_LEN);
    }
});
