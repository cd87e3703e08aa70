//! Bounded line framing for the vision co-processor's serial stream.
//!
//! Bytes accumulate until `\n` or `\r`.  A terminator on an empty buffer
//! is ignored, so `\r\n` pairs and blank lines produce nothing.  A line
//! that outgrows the buffer is thrown away whole (including the byte that
//! overflowed it) and framing restarts on the next byte.

use heapless::Vec;

use crate::error::VisionError;

/// Wire buffer is 32 bytes including the terminator.
pub const MAX_LINE_LEN: usize = 31;

/// The token the vision subsystem sends each frame it sees flame in.
pub const FIRE_TOKEN: &[u8] = b"fire";

pub type Line = Vec<u8, MAX_LINE_LEN>;

#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Line,
}

impl LineFramer {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed one byte.  Returns a completed line when `byte` terminates a
    /// non-empty one.
    pub fn push(&mut self, byte: u8) -> Result<Option<Line>, VisionError> {
        if byte == b'\n' || byte == b'\r' {
            if self.buf.is_empty() {
                return Ok(None);
            }
            return Ok(Some(core::mem::take(&mut self.buf)));
        }
        if self.buf.push(byte).is_err() {
            self.buf.clear();
            return Err(VisionError::LineOverflow);
        }
        Ok(None)
    }

    /// Bytes currently buffered for the pending line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

/// Trimmed, case-insensitive comparison against [`FIRE_TOKEN`].
pub fn is_fire_token(line: &[u8]) -> bool {
    line.trim_ascii().eq_ignore_ascii_case(FIRE_TOKEN)
}
