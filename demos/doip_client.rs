//! DoIP client demo.
//!
//! Connects to a gateway, activates routing, reads the VIN data
//! identifier, and keeps the session alive with functional tester present.
//!
//! Run the gateway first: cargo run --example mock_gateway
//! Then run: cargo run --example doip_client

use doip_rs::{ClientConfig, DoipClient, LogicalAddress, TesterPresentMode};
use std::time::Duration;

const GATEWAY_HOST: &str = "127.0.0.1";
const TESTER_ADDR: u16 = 0x0E00;
const ECU_ADDR: u16 = 0x1000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::default();
    let client = DoipClient::with_logger(
        config,
        Box::new(|line| println!("[doip] {line}")),
    );

    let tester = LogicalAddress(TESTER_ADDR);
    let ecu = LogicalAddress(ECU_ADDR);

    client.connect_and_activate(GATEWAY_HOST, tester)?;
    client.start_tester_present(tester, ecu, TesterPresentMode::Functional)?;

    // ReadDataByIdentifier: VIN (0xF190)
    let response = client.send_diagnostic(tester, ecu, &[0x22, 0xF1, 0x90])?;
    if let Some(uds) = response.uds_data() {
        println!("UDS response: {uds:02X?}");
    }

    // Let a few keep-alive frames go out before shutting down.
    std::thread::sleep(Duration::from_secs(5));

    client.disconnect();
    Ok(())
}
