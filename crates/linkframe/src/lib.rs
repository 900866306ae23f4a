//! Point-to-point framing for small messages over UART and CAN links.
//!
//! linkframe turns outgoing payloads into delimited, escaped, CRC-16 checked
//! byte sequences and turns an arbitrarily fragmented inbound byte stream back
//! into validated messages. On transports that already frame messages (CAN)
//! it passes payloads through untouched.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte and message sink interfaces plus stock sinks
//! - [`frame`]: Checksum, encoder, receive state machine and protocol handler

/// Re-export transport types.
pub mod transport {
    pub use linkframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use linkframe_frame::*;
}
