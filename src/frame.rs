//! DoIP frame handling.

use bytes::Bytes;

use crate::error::{DoipError, Result};
use crate::header::{DoipHeader, HEADER_SIZE};
use crate::types::{LogicalAddress, PayloadType, TesterPresentMode};

/// Byte offset of the activation code within a routing activation
/// response payload.
const ACTIVATION_CODE_OFFSET: usize = 4;

/// Activation code signalling a successful routing activation.
pub const ACTIVATION_SUCCESS: u8 = 0x10;

/// A complete DoIP frame (header + payload).
///
/// The payload buffer length always equals the header's declared
/// `payload_length`; constructors and the codec maintain this invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame header.
    pub header: DoipHeader,
    /// Raw payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame with the given payload type and payload.
    pub fn new(payload_type: u16, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let header = DoipHeader::new(payload_type, payload.len() as u32);
        Self { header, payload }
    }

    /// Build a routing activation request for a tester source address.
    ///
    /// Payload layout (7 bytes): source address, activation type 0x00,
    /// four reserved zero bytes.
    pub fn routing_activation_request(source: LogicalAddress) -> Self {
        let mut payload = Vec::with_capacity(7);
        payload.extend_from_slice(&source.0.to_be_bytes());
        payload.push(0x00);
        payload.extend_from_slice(&[0x00; 4]);
        Self::new(PayloadType::RoutingActivationRequest as u16, payload)
    }

    /// Build a diagnostic message carrying opaque UDS bytes.
    pub fn diagnostic(source: LogicalAddress, target: LogicalAddress, uds: &[u8]) -> Self {
        let mut payload = Vec::with_capacity(4 + uds.len());
        payload.extend_from_slice(&source.0.to_be_bytes());
        payload.extend_from_slice(&target.0.to_be_bytes());
        payload.extend_from_slice(uds);
        Self::new(PayloadType::DiagnosticMessage as u16, payload)
    }

    /// Build a TesterPresent keep-alive message.
    ///
    /// Functional mode targets `0xFFFF` with body `3E 80`
    /// (suppress-positive-response); physical mode targets the given ECU
    /// address with body `3E 00`.
    pub fn tester_present(
        source: LogicalAddress,
        physical_target: LogicalAddress,
        mode: TesterPresentMode,
    ) -> Self {
        let target = mode.resolve_target(physical_target);
        Self::diagnostic(source, target, &mode.uds_body())
    }

    /// Classify the payload type, if known to this client.
    pub fn kind(&self) -> Option<PayloadType> {
        PayloadType::from_u16(self.header.payload_type)
    }

    /// The raw payload type wire value.
    pub fn raw_type(&self) -> u16 {
        self.header.payload_type
    }

    /// The activation code of a routing activation response
    /// (payload offset 4; 0x10 means success).
    pub fn activation_code(&self) -> Option<u8> {
        if self.kind() != Some(PayloadType::RoutingActivationResponse) {
            return None;
        }
        self.payload.get(ACTIVATION_CODE_OFFSET).copied()
    }

    /// The NACK code of a diagnostic message negative acknowledgement.
    pub fn nack_code(&self) -> Option<u8> {
        if self.kind() != Some(PayloadType::DiagnosticMessageNack) {
            return None;
        }
        self.payload.get(4).copied()
    }

    /// The source address of a diagnostic message payload.
    pub fn source_address(&self) -> Option<LogicalAddress> {
        let bytes = self.payload.get(0..2)?;
        Some(LogicalAddress(u16::from_be_bytes([bytes[0], bytes[1]])))
    }

    /// The target address of a diagnostic message payload.
    pub fn target_address(&self) -> Option<LogicalAddress> {
        let bytes = self.payload.get(2..4)?;
        Some(LogicalAddress(u16::from_be_bytes([bytes[0], bytes[1]])))
    }

    /// The UDS bytes of a diagnostic message payload (opaque to this
    /// layer).
    pub fn uds_data(&self) -> Option<&[u8]> {
        self.payload.get(4..)
    }

    /// Parse a complete frame from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = DoipHeader::from_bytes(data)?;
        let expected_total = HEADER_SIZE + header.payload_length as usize;

        if data.len() < expected_total {
            return Err(DoipError::HeaderTooShort {
                expected: expected_total,
                actual: data.len(),
            });
        }

        let payload = Bytes::copy_from_slice(&data[HEADER_SIZE..expected_total]);
        Ok(Self { header, payload })
    }

    /// Serialize the frame to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        buf.extend_from_slice(&self.header.to_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Total frame size on the wire (header + payload).
    pub fn total_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_activation_request_layout() {
        let frame = Frame::routing_activation_request(LogicalAddress(0x0E00));

        assert_eq!(frame.raw_type(), 0x0005);
        assert_eq!(frame.header.payload_length, 7);
        assert_eq!(
            frame.payload.as_ref(),
            &[0x0E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_diagnostic_layout() {
        let frame = Frame::diagnostic(
            LogicalAddress(0x0E00),
            LogicalAddress(0x1000),
            &[0x22, 0xF1, 0x90],
        );

        assert_eq!(frame.kind(), Some(PayloadType::DiagnosticMessage));
        assert_eq!(frame.payload.as_ref(), &[0x0E, 0x00, 0x10, 0x00, 0x22, 0xF1, 0x90]);
        assert_eq!(frame.source_address(), Some(LogicalAddress(0x0E00)));
        assert_eq!(frame.target_address(), Some(LogicalAddress(0x1000)));
        assert_eq!(frame.uds_data(), Some(&[0x22, 0xF1, 0x90][..]));
    }

    #[test]
    fn test_tester_present_functional() {
        let frame = Frame::tester_present(
            LogicalAddress(0x0E00),
            LogicalAddress(0x1000),
            TesterPresentMode::Functional,
        );

        assert_eq!(frame.target_address(), Some(LogicalAddress::FUNCTIONAL));
        assert_eq!(frame.uds_data(), Some(&[0x3E, 0x80][..]));
    }

    #[test]
    fn test_tester_present_physical() {
        let frame = Frame::tester_present(
            LogicalAddress(0x0E00),
            LogicalAddress(0x1000),
            TesterPresentMode::Physical,
        );

        assert_eq!(frame.target_address(), Some(LogicalAddress(0x1000)));
        assert_eq!(frame.uds_data(), Some(&[0x3E, 0x00][..]));
    }

    #[test]
    fn test_activation_code() {
        let response = Frame::new(
            PayloadType::RoutingActivationResponse as u16,
            vec![0x0E, 0x00, 0x10, 0x00, 0x10],
        );
        assert_eq!(response.activation_code(), Some(0x10));

        // Wrong type never yields a code.
        let diag = Frame::new(
            PayloadType::DiagnosticMessage as u16,
            vec![0x0E, 0x00, 0x10, 0x00, 0x10],
        );
        assert_eq!(diag.activation_code(), None);

        // Short payload yields none.
        let short = Frame::new(PayloadType::RoutingActivationResponse as u16, vec![0x0E]);
        assert_eq!(short.activation_code(), None);
    }

    #[test]
    fn test_nack_code() {
        let nack = Frame::new(
            PayloadType::DiagnosticMessageNack as u16,
            vec![0x10, 0x00, 0x0E, 0x00, 0x02],
        );
        assert_eq!(nack.nack_code(), Some(0x02));
    }

    #[test]
    fn test_frame_roundtrip() {
        let original = Frame::diagnostic(
            LogicalAddress(0x0E00),
            LogicalAddress(0x1000),
            &[0x10, 0x03],
        );

        let bytes = original.to_bytes();
        assert_eq!(bytes.len(), original.total_size());

        let parsed = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let frame = Frame::new(0x4002, vec![0xAA, 0xBB]);
        assert_eq!(frame.kind(), None);
        assert_eq!(frame.raw_type(), 0x4002);

        let parsed = Frame::from_bytes(&frame.to_bytes()).unwrap();
        assert_eq!(parsed.raw_type(), 0x4002);
        assert_eq!(parsed.payload.as_ref(), &[0xAA, 0xBB]);
    }
}
