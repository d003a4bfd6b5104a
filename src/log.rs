//! Log line emission toward the embedding application.
//!
//! The client's only coupling to its surrounding GUI or automation caller
//! is a callback invoked with one human-readable line per protocol event.
//! Thread marshaling and display are the callback's responsibility.

use crate::frame::Frame;

/// Callback receiving one log line per significant protocol event.
pub type LogSink = Box<dyn Fn(&str) + Send + Sync>;

/// A sink that discards all lines.
pub fn null_sink() -> LogSink {
    Box::new(|_| {})
}

/// Uppercase hex dump of a byte slice.
pub fn hex_upper(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// One-line summary of a frame for logging.
pub fn frame_summary(frame: &Frame) -> String {
    format!(
        "type=0x{:04X}, length={}, payload={}",
        frame.raw_type(),
        frame.header.payload_length,
        hex_upper(&frame.payload)
    )
}
