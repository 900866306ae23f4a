use linkframe_transport::TransportError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The receive buffer is full and another payload byte arrived.
    #[error("receive buffer overflow (capacity {capacity} bytes)")]
    BufferOverflow { capacity: usize },

    /// The outgoing payload exceeds the configured maximum.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A trailing checksum byte disagrees with the checksum of the payload.
    #[error("checksum mismatch (expected 0x{expected:02X}, received 0x{received:02X})")]
    ChecksumMismatch { expected: u8, received: u8 },

    /// Malformed escape sequence. Doubled delimiters are the only escape in
    /// the current wire format, so the decoder never produces this.
    #[error("unknown escaped byte 0x{0:02X}")]
    UnknownEscapedByte(u8),

    /// The byte sink refused a byte mid-send.
    #[error("transport write failed: {0}")]
    Transport(#[from] TransportError),

    /// The handler was constructed with an unusable configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred while reading the inbound stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`FrameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BufferOverflow,
    ChecksumMismatch,
    UnknownEscapedByte,
    Transport,
    Config,
}

impl FrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::BufferOverflow { .. } | FrameError::PayloadTooLarge { .. } => {
                ErrorKind::BufferOverflow
            }
            FrameError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            FrameError::UnknownEscapedByte(_) => ErrorKind::UnknownEscapedByte,
            FrameError::Transport(_) | FrameError::Io(_) => ErrorKind::Transport,
            FrameError::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// True for errors raised while decoding inbound bytes. The handler has
    /// already dropped the partial frame when one of these is returned.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            FrameError::BufferOverflow { .. }
                | FrameError::ChecksumMismatch { .. }
                | FrameError::UnknownEscapedByte(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_error_taxonomy() {
        assert_eq!(
            FrameError::BufferOverflow { capacity: 8 }.kind(),
            ErrorKind::BufferOverflow
        );
        assert_eq!(
            FrameError::PayloadTooLarge { size: 9, max: 8 }.kind(),
            ErrorKind::BufferOverflow
        );
        assert_eq!(
            FrameError::ChecksumMismatch {
                expected: 0x0E,
                received: 0x0F
            }
            .kind(),
            ErrorKind::ChecksumMismatch
        );
        assert_eq!(
            FrameError::Transport(TransportError::Closed).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            FrameError::InvalidConfig("x".into()).kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn decode_errors_are_flagged() {
        assert!(FrameError::BufferOverflow { capacity: 1 }.is_decode_error());
        assert!(!FrameError::PayloadTooLarge { size: 9, max: 8 }.is_decode_error());
        assert!(!FrameError::Transport(TransportError::Closed).is_decode_error());
    }

    #[test]
    fn display_formats_checksum_bytes_in_hex() {
        let err = FrameError::ChecksumMismatch {
            expected: 0x0E,
            received: 0x7C,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch (expected 0x0E, received 0x7C)"
        );
    }
}
