use std::io::{ErrorKind, Write};

use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{ByteSink, MessageSink};

/// Adapts any `std::io::Write` stream (serial port, socket, file) into a
/// [`ByteSink`].
///
/// Each byte is written individually; `Interrupted` and `WouldBlock` are
/// retried, a zero-length write is reported as [`TransportError::Closed`].
pub struct IoSink<W> {
    inner: W,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the sink and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        loop {
            match self.inner.write(&[byte]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<W> std::fmt::Debug for IoSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoSink").finish_non_exhaustive()
    }
}

/// Bounded in-memory transmit buffer, the shape of a UART TX FIFO.
///
/// Accepts bytes until `capacity` is reached, then fails every write with
/// [`TransportError::Full`] until drained.
#[derive(Debug, Clone)]
pub struct FifoSink {
    buf: Vec<u8>,
    capacity: usize,
}

impl FifoSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Bytes accepted so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take every buffered byte, leaving the FIFO empty.
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

impl ByteSink for FifoSink {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.buf.len() >= self.capacity {
            debug!(capacity = self.capacity, "transmit fifo full");
            return Err(TransportError::Full {
                capacity: self.capacity,
            });
        }
        self.buf.push(byte);
        Ok(())
    }
}

/// Message sink that keeps an owned copy of every delivered message.
#[derive(Debug, Default, Clone)]
pub struct FrameCollector {
    messages: Vec<Bytes>,
}

impl FrameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    pub fn messages(&self) -> &[Bytes] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Remove and return all collected messages.
    pub fn take(&mut self) -> Vec<Bytes> {
        std::mem::take(&mut self.messages)
    }
}

impl MessageSink for FrameCollector {
    fn on_message(&mut self, payload: &[u8]) {
        self.messages.push(Bytes::copy_from_slice(payload));
    }
}
