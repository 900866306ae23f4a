/// Errors reported by a byte sink while transmitting.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The sink has no room left for another byte.
    #[error("transmit buffer full ({capacity} bytes)")]
    Full { capacity: usize },

    /// The underlying stream accepted zero bytes.
    #[error("transport closed")]
    Closed,

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
