//! Two handlers joined back to back over an in-memory "wire".
//!
//! Run with:
//!   cargo run --example loopback

use linkframe::frame::{FrameConfig, ProtocolHandler};
use linkframe::transport::FrameCollector;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = FrameConfig::default();

    let mut tx_buf = [0u8; 8];
    let mut sender = ProtocolHandler::new(config, &mut tx_buf, Vec::new(), FrameCollector::new())?;
    let payloads: [&[u8]; 3] = [b"ping", &[0x01, 0x7E, 0x02], &[]];
    for payload in payloads {
        sender.send_message(payload)?;
    }
    let (wire, _) = sender.into_parts();
    eprintln!("wire: {wire:02X?}");

    let mut rx_buf = [0u8; 8];
    let mut receiver = ProtocolHandler::new(
        config,
        &mut rx_buf,
        Vec::new(),
        |payload: &[u8]| eprintln!("received {} bytes: {payload:02X?}", payload.len()),
    )?;

    // Feed the stream in uneven pieces, the way a UART driver hands it over.
    for chunk in wire.chunks(3) {
        receiver.read(chunk)?;
    }
    eprintln!("frames received: {}", receiver.frames_received());

    Ok(())
}
