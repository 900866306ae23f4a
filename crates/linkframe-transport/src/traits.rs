use bytes::{BufMut, BytesMut};

use crate::error::Result;

/// Destination for outgoing wire bytes.
///
/// `write_byte` is called once per wire byte and must only return `Ok` when
/// the byte was actually delivered or buffered. The encoder aborts the send on
/// the first error; bytes already written are not retracted.
pub trait ByteSink {
    /// Transmit a single byte.
    fn write_byte(&mut self, byte: u8) -> Result<()>;
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.push(byte);
        Ok(())
    }
}

impl ByteSink for BytesMut {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.put_u8(byte);
        Ok(())
    }
}

/// Receiver of validated inbound messages.
///
/// Invoked synchronously, exactly once per accepted frame. The payload slice
/// borrows the handler's receive buffer and is overwritten by the next frame,
/// so implementations must copy anything they want to keep.
pub trait MessageSink {
    /// Handle one complete message.
    fn on_message(&mut self, payload: &[u8]);
}

impl<F: FnMut(&[u8])> MessageSink for F {
    fn on_message(&mut self, payload: &[u8]) {
        self(payload)
    }
}
