//! Link-layer framing for small messages over byte-oriented serial links.
//!
//! Two modes are supported, chosen per handler at construction time:
//! - **Delimited** (UART and other raw byte streams): every frame is
//!   `DELIM | LEN | PAYLOAD | CRC_HI | CRC_LO`, with any byte equal to the
//!   delimiter doubled on the wire, and a CRC-16/CCITT-FALSE over the payload.
//! - **Direct** (CAN and other naturally framed transports): payload bytes pass
//!   through untouched and the caller's batch boundaries delimit messages.
//!
//! The [`ProtocolHandler`] is the only stateful piece: it owns the receive
//! state machine, borrows the caller's receive buffer, and drives the byte and
//! message sinks from `linkframe-transport`.

pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod pump;

pub use codec::{max_packet_len, FrameConfig, FrameMode, DELIMITER, MAX_PAYLOAD_LEN};
pub use decoder::{DecodeState, Decoder};
pub use encoder::{encode_frame, encode_to_vec};
pub use error::{ErrorKind, FrameError, Result};
pub use handler::ProtocolHandler;
pub use pump::{FramePump, PumpStats};
