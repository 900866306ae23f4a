//! Collaborator interfaces for the linkframe framing layer.
//!
//! The framing core never touches a physical link directly. It talks to:
//! - a [`ByteSink`], called once per wire byte when sending
//! - a [`MessageSink`], called once per validated inbound message
//!
//! This is the lowest layer of linkframe. Concrete sinks for in-memory
//! buffers, `std::io::Write` streams and bounded transmit FIFOs live in
//! [`sinks`].

pub mod error;
pub mod sinks;
pub mod traits;

pub use error::{Result, TransportError};
pub use sinks::{FifoSink, FrameCollector, IoSink};
pub use traits::{ByteSink, MessageSink};
