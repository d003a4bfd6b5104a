//! Error types for DoIP operations.

use std::io;
use thiserror::Error;

/// Errors that can occur during DoIP operations.
#[derive(Error, Debug)]
pub enum DoipError {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The TCP connection to the gateway could not be established.
    #[error("Connect failed: {0}")]
    ConnectFailed(io::Error),

    /// No frame arrived within the read deadline. The connection is left
    /// open; the caller may retry.
    #[error("Operation timed out")]
    Timeout,

    /// The peer closed the connection mid-frame or between frames.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// The version / inverse-version pair of a received header is
    /// inconsistent. Treated as a fatal transport error.
    #[error("Malformed header: version 0x{version:02X}, inverse 0x{inverse:02X}")]
    MalformedHeader { version: u8, inverse: u8 },

    /// Not enough bytes to contain a DoIP header.
    #[error("Header too short: expected {expected} bytes, got {actual}")]
    HeaderTooShort { expected: usize, actual: usize },

    /// Operation requires an established session.
    #[error("Not connected")]
    NotConnected,

    /// Routing activation was refused by the gateway.
    #[error("Routing activation rejected (code 0x{code:02X})")]
    ActivationRejected { code: u8 },

    /// The gateway negatively acknowledged a diagnostic message.
    #[error("Diagnostic message NACK (code 0x{code:02X})")]
    NackReceived { code: u8 },

    /// A frame of an unexpected payload type arrived in a correlated
    /// exchange.
    #[error("Unexpected payload type: expected 0x{expected:04X}, got 0x{actual:04X}")]
    UnexpectedPayloadType { expected: u16, actual: u16 },
}

/// Result type alias for DoIP operations.
pub type Result<T> = std::result::Result<T, DoipError>;

impl DoipError {
    /// Check if this error breaks the transport.
    ///
    /// Fatal errors force the session to `Disconnected`; protocol-level
    /// rejections and timeouts leave the connection open.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::ConnectFailed(_)
                | Self::ConnectionClosed
                | Self::MalformedHeader { .. }
        )
    }
}
