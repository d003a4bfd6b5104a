//! DoIP (ISO 13400) diagnostic tester client built on std::net.
//!
//! This crate provides a synchronous client for Diagnostics over IP, the
//! binary framing protocol used to carry automotive diagnostic (UDS)
//! traffic between a tester and a vehicle gateway over TCP.
//!
//! # Features
//!
//! - 8-byte DoIP header codec with version-checksum validation
//! - Routing activation handshake
//! - Diagnostic message exchange with ACK/response correlation
//! - Background TesterPresent keep-alive loop (functional or physical
//!   addressing) sharing the socket safely with synchronous calls
//! - Log line callback for embedding in a GUI or automation harness
//!
//! # Example
//!
//! ```no_run
//! use doip_rs::{ClientConfig, DoipClient, LogicalAddress, TesterPresentMode};
//!
//! let client = DoipClient::new(ClientConfig::default());
//! let tester = LogicalAddress(0x0E00);
//! let ecu = LogicalAddress(0x1000);
//!
//! client.connect("192.168.0.10").unwrap();
//! client.activate_routing(tester).unwrap();
//! client.start_tester_present(tester, ecu, TesterPresentMode::Functional).unwrap();
//!
//! let response = client.send_diagnostic(tester, ecu, &[0x22, 0xF1, 0x90]).unwrap();
//! println!("Response: {:02X?}", response.uds_data());
//!
//! client.disconnect();
//! ```
//!
//! # Protocol Overview
//!
//! DoIP frames consist of an 8-byte header followed by a payload:
//!
//! ```text
//! +--------+--------+--------+--------+
//! | Ver    | ~Ver   |  Payload Type   |  (4 bytes)
//! +--------+--------+--------+--------+
//! |        Payload Length             |  (4 bytes)
//! +--------+--------+--------+--------+
//! |        Payload ...                |  (variable)
//! +--------+--------+--------+--------+
//! ```
//!
//! `Ver` is the protocol version (0x02) and `~Ver` its bitwise inverse;
//! a mismatching pair marks a corrupt or foreign frame. Diagnostic message
//! payloads start with a source and target logical address (16 bits each)
//! followed by opaque UDS service bytes.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod frame;
pub mod header;
pub mod log;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used types at the crate root
pub use client::DoipClient;
pub use config::ClientConfig;
pub use error::{DoipError, Result};
pub use frame::{ACTIVATION_SUCCESS, Frame};
pub use header::{DoipHeader, HEADER_SIZE};
pub use log::LogSink;
pub use session::{SessionState, SessionStats};
pub use transport::{DEFAULT_PORT, TcpTransport};
pub use types::{
    FUNCTIONAL_TARGET_ADDRESS, LogicalAddress, PROTOCOL_VERSION, PayloadType, TesterPresentMode,
};
