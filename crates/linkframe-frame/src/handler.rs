use linkframe_transport::{ByteSink, MessageSink};
use tracing::debug;

use crate::codec::{FrameConfig, FrameMode};
use crate::decoder::{DecodeState, Decoder};
use crate::encoder::encode_frame;
use crate::error::Result;

/// One end of a point-to-point link.
///
/// Ties together the receive state machine, the caller's receive buffer, the
/// byte sink used for sending and the message sink fed on reception. Create
/// one per physical link; the handler is not meant to be shared between
/// transports or driven from several threads at once.
pub struct ProtocolHandler<'buf, W, M> {
    config: FrameConfig,
    decoder: Decoder<'buf>,
    sink: W,
    messages: M,
}

impl<'buf, W: ByteSink, M: MessageSink> ProtocolHandler<'buf, W, M> {
    /// Create a handler in its initial wait-for-delimiter state.
    ///
    /// Misconfiguration (payload limit outside `1..=255`, zero-capacity
    /// receive buffer) is rejected here with `FrameError::InvalidConfig`.
    pub fn new(config: FrameConfig, buffer: &'buf mut [u8], sink: W, messages: M) -> Result<Self> {
        config.validate()?;
        let decoder = Decoder::new(config.mode, buffer)?;
        debug!(
            mode = %config.mode,
            max_payload_len = config.max_payload_len,
            capacity = decoder.capacity(),
            "protocol handler initialized"
        );

        Ok(Self {
            config,
            decoder,
            sink,
            messages,
        })
    }

    /// Feed one inbound byte.
    pub fn read_byte(&mut self, byte: u8) -> Result<()> {
        self.decoder.read_byte(byte, &mut self.messages)
    }

    /// Feed a batch of inbound bytes, stopping at the first error.
    ///
    /// In direct mode the batch is one complete message.
    pub fn read(&mut self, bytes: &[u8]) -> Result<()> {
        self.decoder.read(bytes, &mut self.messages)
    }

    /// Encode and transmit one message through the byte sink.
    pub fn send_message(&mut self, payload: &[u8]) -> Result<()> {
        encode_frame(&self.config, payload, &mut self.sink)
    }

    /// Drop any partial inbound frame.
    pub fn reset(&mut self) {
        self.decoder.reset();
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn mode(&self) -> FrameMode {
        self.config.mode
    }

    pub fn state(&self) -> DecodeState {
        self.decoder.state()
    }

    /// Payload bytes accumulated for the frame in progress.
    pub fn payload_len(&self) -> usize {
        self.decoder.payload_len()
    }

    /// Capacity of the receive buffer.
    pub fn capacity(&self) -> usize {
        self.decoder.capacity()
    }

    /// Number of messages delivered since creation.
    pub fn frames_received(&self) -> u64 {
        self.decoder.frames_received()
    }

    /// Borrow the byte sink.
    pub fn byte_sink(&self) -> &W {
        &self.sink
    }

    /// Mutably borrow the byte sink.
    pub fn byte_sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Borrow the message sink.
    pub fn message_sink(&self) -> &M {
        &self.messages
    }

    /// Mutably borrow the message sink.
    pub fn message_sink_mut(&mut self) -> &mut M {
        &mut self.messages
    }

    /// Consume the handler and return both sinks.
    pub fn into_parts(self) -> (W, M) {
        (self.sink, self.messages)
    }
}

impl<W, M> std::fmt::Debug for ProtocolHandler<'_, W, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolHandler")
            .field("config", &self.config)
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}
