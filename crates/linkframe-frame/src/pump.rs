use std::io::{ErrorKind, Read};

use linkframe_transport::{ByteSink, MessageSink};
use tracing::{debug, warn};

use crate::codec::FrameMode;
use crate::error::{FrameError, Result};
use crate::handler::ProtocolHandler;

const READ_CHUNK_SIZE: usize = 256;

/// Counters from a [`FramePump`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Raw bytes read from the stream.
    pub bytes: u64,
    /// Messages delivered to the handler's message sink.
    pub frames: u64,
    /// Decode errors logged and skipped.
    pub errors: u64,
}

/// Drives a [`ProtocolHandler`] from any `Read` stream.
///
/// In delimited mode bytes are fed one at a time and decode errors are logged
/// and counted rather than returned, so a corrupt frame never stops the pump;
/// the handler resynchronizes on the next delimiter. In direct mode every
/// successful `read` call is handed over as one complete message.
pub struct FramePump<R> {
    inner: R,
    stats: PumpStats,
}

impl<R: Read> FramePump<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            stats: PumpStats::default(),
        }
    }

    /// Pump until EOF and return the accumulated counters.
    pub fn run<W, M>(&mut self, handler: &mut ProtocolHandler<'_, W, M>) -> Result<PumpStats>
    where
        W: ByteSink,
        M: MessageSink,
    {
        while self.pump_once(handler)?.is_some() {}
        debug!(
            bytes = self.stats.bytes,
            frames = self.stats.frames,
            errors = self.stats.errors,
            "stream ended"
        );
        Ok(self.stats)
    }

    /// Read one chunk and feed it to `handler`.
    ///
    /// Returns `Ok(None)` at EOF, otherwise the number of bytes consumed.
    pub fn pump_once<W, M>(
        &mut self,
        handler: &mut ProtocolHandler<'_, W, M>,
    ) -> Result<Option<usize>>
    where
        W: ByteSink,
        M: MessageSink,
    {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let read = loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        if read == 0 {
            return Ok(None);
        }

        let frames_before = handler.frames_received();
        match handler.mode() {
            FrameMode::Delimited => {
                for &byte in &chunk[..read] {
                    if let Err(err) = handler.read_byte(byte) {
                        self.record(err)?;
                    }
                }
            }
            FrameMode::Direct => {
                if let Err(err) = handler.read(&chunk[..read]) {
                    self.record(err)?;
                }
            }
        }

        self.stats.bytes += read as u64;
        self.stats.frames += handler.frames_received() - frames_before;
        Ok(Some(read))
    }

    /// Counters so far.
    pub fn stats(&self) -> PumpStats {
        self.stats
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the pump and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn record(&mut self, err: FrameError) -> Result<()> {
        if !err.is_decode_error() {
            return Err(err);
        }
        warn!(error = %err, "dropped malformed frame");
        self.stats.errors += 1;
        Ok(())
    }
}
