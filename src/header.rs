//! DoIP header encoding and decoding.

use crate::error::{DoipError, Result};
use crate::types::PROTOCOL_VERSION;

/// Size of the DoIP header in bytes.
pub const HEADER_SIZE: usize = 8;

/// DoIP message header (8 bytes).
///
/// ```text
/// +----------------+----------------+----------------+----------------+
/// | Protocol Ver   | Inverse Ver    |      Payload Type (16 bits)     |
/// | (8 bits)       | (8 bits)       |                                 |
/// +----------------+----------------+----------------+----------------+
/// |           Payload Length (32 bits)                                |
/// +----------------+----------------+----------------+----------------+
/// ```
///
/// The inverse version byte must always equal `protocol_version ^ 0xFF`;
/// a mismatching pair marks a corrupt or foreign frame and is rejected
/// before any payload is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoipHeader {
    /// Protocol version (0x02).
    pub protocol_version: u8,
    /// Payload type as a raw wire value. Known values are classified by
    /// [`PayloadType::from_u16`](crate::types::PayloadType::from_u16);
    /// unknown values pass through untouched.
    pub payload_type: u16,
    /// Number of payload bytes following the header.
    pub payload_length: u32,
}

impl DoipHeader {
    /// Create a header for the given payload type and length.
    pub fn new(payload_type: u16, payload_length: u32) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            payload_type,
            payload_length,
        }
    }

    /// The inverse protocol version byte for this header.
    pub fn inverse_version(&self) -> u8 {
        self.protocol_version ^ 0xFF
    }

    /// Parse a header from bytes, validating the version checksum.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(DoipError::HeaderTooShort {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let protocol_version = data[0];
        let inverse_version = data[1];

        if inverse_version != protocol_version ^ 0xFF {
            return Err(DoipError::MalformedHeader {
                version: protocol_version,
                inverse: inverse_version,
            });
        }

        let payload_type = u16::from_be_bytes([data[2], data[3]]);
        let payload_length = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

        Ok(Self {
            protocol_version,
            payload_type,
            payload_length,
        })
    }

    /// Serialize the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0] = self.protocol_version;
        buf[1] = self.inverse_version();
        buf[2..4].copy_from_slice(&self.payload_type.to_be_bytes());
        buf[4..8].copy_from_slice(&self.payload_length.to_be_bytes());

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PayloadType;

    #[test]
    fn test_header_roundtrip() {
        let header = DoipHeader::new(PayloadType::DiagnosticMessage as u16, 0x0000_0006);

        let bytes = header.to_bytes();
        let parsed = DoipHeader::from_bytes(&bytes).unwrap();

        assert_eq!(header, parsed);
        assert_eq!(parsed.protocol_version, 0x02);
        assert_eq!(parsed.inverse_version(), 0xFD);
        assert_eq!(parsed.payload_type, 0x8001);
        assert_eq!(parsed.payload_length, 6);
    }

    #[test]
    fn test_header_byte_order() {
        let header = DoipHeader::new(0x8001, 0x0102_0304);
        let bytes = header.to_bytes();

        assert_eq!(bytes[0], 0x02); // Protocol version
        assert_eq!(bytes[1], 0xFD); // Inverse version
        assert_eq!(bytes[2], 0x80); // Payload type high byte
        assert_eq!(bytes[3], 0x01); // Payload type low byte
        assert_eq!(&bytes[4..8], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_checksum_rejection() {
        let header = DoipHeader::new(0x0005, 7);
        let good = header.to_bytes();

        // Flipping any bit of the inverse byte must fail the decode.
        for bit in 0..8 {
            let mut bytes = good;
            bytes[1] ^= 1 << bit;
            let result = DoipHeader::from_bytes(&bytes);
            assert!(matches!(result, Err(DoipError::MalformedHeader { .. })));
        }
    }

    #[test]
    fn test_parse_too_short() {
        let data = [0u8; 5];
        let result = DoipHeader::from_bytes(&data);
        assert!(matches!(result, Err(DoipError::HeaderTooShort { .. })));
    }
}
