//! DoIP frame framing over byte streams.

use std::io::{self, Read, Write};

use crate::error::{DoipError, Result};
use crate::frame::Frame;
use crate::header::{DoipHeader, HEADER_SIZE};

/// Read a complete DoIP frame from a stream.
///
/// Handles TCP framing by first reading the 8-byte header, then reading
/// exactly `payload_length` body bytes, looping over partial reads until
/// satisfied. A peer close mid-frame yields [`DoipError::ConnectionClosed`];
/// an expired read deadline yields [`DoipError::Timeout`].
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Frame> {
    let mut header_buf = [0u8; HEADER_SIZE];
    read_exact(reader, &mut header_buf)?;

    let header = DoipHeader::from_bytes(&header_buf)?;
    let payload_len = header.payload_length as usize;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        read_exact(reader, &mut payload)?;
    }

    Ok(Frame {
        header,
        payload: payload.into(),
    })
}

/// Write a complete DoIP frame to a stream.
pub fn write_frame<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    writer.write_all(&frame.header.to_bytes())?;
    writer.write_all(&frame.payload)?;
    Ok(())
}

/// Fill `buf` completely, distinguishing peer close from timeout.
fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => DoipError::ConnectionClosed,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => DoipError::Timeout,
        _ => DoipError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogicalAddress, PayloadType};

    /// A reader that delivers its data in fixed-size chunks, exercising
    /// the short-read loop.
    struct ChunkedReader {
        data: Vec<u8>,
        position: usize,
        chunk_size: usize,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.position >= self.data.len() {
                return Ok(0);
            }
            let end = (self.position + self.chunk_size).min(self.data.len());
            let n = (end - self.position).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
            self.position += n;
            Ok(n)
        }
    }

    #[test]
    fn test_read_write_roundtrip() {
        let original = Frame::diagnostic(
            LogicalAddress(0x0E00),
            LogicalAddress(0x1000),
            &[0x22, 0xF1, 0x90],
        );

        let mut buffer = Vec::new();
        write_frame(&mut buffer, &original).unwrap();

        let mut cursor = std::io::Cursor::new(buffer);
        let parsed = read_frame(&mut cursor).unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn test_read_one_byte_at_a_time() {
        let frame = Frame::diagnostic(
            LogicalAddress(0x0E00),
            LogicalAddress(0x1000),
            &[0x3E, 0x00],
        );

        let mut reader = ChunkedReader {
            data: frame.to_bytes(),
            position: 0,
            chunk_size: 1,
        };

        let parsed = read_frame(&mut reader).unwrap();
        assert_eq!(frame, parsed);
    }

    #[test]
    fn test_read_empty_payload() {
        let frame = Frame::new(PayloadType::DiagnosticMessageAck as u16, Vec::new());

        let mut cursor = std::io::Cursor::new(frame.to_bytes());
        let parsed = read_frame(&mut cursor).unwrap();

        assert_eq!(parsed.header.payload_length, 0);
        assert!(parsed.payload.is_empty());
    }

    #[test]
    fn test_close_mid_header() {
        let mut cursor = std::io::Cursor::new(vec![0x02, 0xFD, 0x80]);
        let result = read_frame(&mut cursor);
        assert!(matches!(result, Err(DoipError::ConnectionClosed)));
    }

    #[test]
    fn test_close_mid_payload() {
        let frame = Frame::diagnostic(
            LogicalAddress(0x0E00),
            LogicalAddress(0x1000),
            &[0x22, 0xF1, 0x90],
        );
        let mut bytes = frame.to_bytes();
        bytes.truncate(bytes.len() - 2);

        let mut cursor = std::io::Cursor::new(bytes);
        let result = read_frame(&mut cursor);
        assert!(matches!(result, Err(DoipError::ConnectionClosed)));
    }

    #[test]
    fn test_malformed_header_rejected_before_payload() {
        // Inverse byte broken; the payload after it must never be touched.
        let bytes = vec![0x02, 0xFF, 0x80, 0x01, 0x00, 0x00, 0x00, 0x02, 0xAA, 0xBB];
        let mut cursor = std::io::Cursor::new(bytes);
        let result = read_frame(&mut cursor);
        assert!(matches!(result, Err(DoipError::MalformedHeader { .. })));
        assert_eq!(cursor.position(), HEADER_SIZE as u64);
    }
}
