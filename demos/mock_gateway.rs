//! Minimal DoIP gateway for exercising the client demo.
//!
//! Accepts one connection at a time, grants every routing activation, and
//! answers ReadDataByIdentifier requests with a canned positive response.
//! TesterPresent frames with the suppress bit are consumed silently.
//!
//! Run: cargo run --example mock_gateway

use doip_rs::codec::{read_frame, write_frame};
use doip_rs::{DEFAULT_PORT, DoipError, Frame, PayloadType};
use std::net::{TcpListener, TcpStream};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(("127.0.0.1", DEFAULT_PORT))?;
    println!("Mock DoIP gateway listening on {}", listener.local_addr()?);

    for stream in listener.incoming() {
        let mut stream = stream?;
        println!("Tester connected: {}", stream.peer_addr()?);
        if let Err(e) = serve(&mut stream) {
            println!("Session ended: {e}");
        }
    }
    Ok(())
}

fn serve(stream: &mut TcpStream) -> doip_rs::Result<()> {
    loop {
        let frame = match read_frame(stream) {
            Ok(frame) => frame,
            Err(DoipError::ConnectionClosed) => {
                println!("Tester disconnected.");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match frame.kind() {
            Some(PayloadType::RoutingActivationRequest) => {
                let source = frame.source_address().unwrap_or_default();
                println!("Routing activation from {source}, granting");
                let response = Frame::new(
                    PayloadType::RoutingActivationResponse as u16,
                    vec![
                        (source.0 >> 8) as u8,
                        source.0 as u8,
                        0x10,
                        0x00,
                        0x10, // activation code: success
                    ],
                );
                write_frame(stream, &response)?;
            }
            Some(PayloadType::DiagnosticMessage) => {
                let source = frame.source_address().unwrap_or_default();
                let target = frame.target_address().unwrap_or_default();
                let uds = frame.uds_data().unwrap_or_default();

                if uds.first() == Some(&0x3E) {
                    println!("TesterPresent from {source} to {target}");
                    continue;
                }

                println!("Diagnostic request {source} -> {target}: {uds:02X?}");
                let ack = Frame::new(
                    PayloadType::DiagnosticMessageAck as u16,
                    vec![
                        (target.0 >> 8) as u8,
                        target.0 as u8,
                        (source.0 >> 8) as u8,
                        source.0 as u8,
                        0x00,
                    ],
                );
                write_frame(stream, &ack)?;

                // Positive ReadDataByIdentifier response: echo the DID,
                // then a fake record.
                let mut reply = vec![0x62];
                reply.extend_from_slice(uds.get(1..3).unwrap_or(&[0x00, 0x00]));
                reply.extend_from_slice(b"DOIPRS00000000017");
                let response = Frame::diagnostic(target, source, &reply);
                write_frame(stream, &response)?;
            }
            _ => {
                println!("Ignoring frame type 0x{:04X}", frame.raw_type());
            }
        }
    }
}
