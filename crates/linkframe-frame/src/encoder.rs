use linkframe_transport::ByteSink;
use tracing::trace;

use crate::checksum::{self, CRC_SEED};
use crate::codec::{max_packet_len, FrameConfig, FrameMode, DELIMITER};
use crate::error::{FrameError, Result};

/// Encode `payload` and push the wire bytes into `sink`.
///
/// Wire format (delimited mode):
/// ```text
/// ┌────────┬───────────┬──────────────────┬──────────┬──────────┐
/// │ DELIM  │ LEN       │ PAYLOAD          │ CRC_HI   │ CRC_LO   │
/// │ 0x7E   │ (escaped) │ (LEN, escaped)   │(escaped) │(escaped) │
/// └────────┴───────────┴──────────────────┴──────────┴──────────┘
/// ```
/// "Escaped" means a byte equal to [`DELIMITER`] is written twice. In direct
/// mode the payload is written verbatim.
///
/// An oversized payload is rejected before anything is written. A failing
/// sink aborts the send immediately; bytes it already accepted stay written.
pub fn encode_frame<W>(config: &FrameConfig, payload: &[u8], sink: &mut W) -> Result<()>
where
    W: ByteSink + ?Sized,
{
    if payload.len() > config.max_payload_len {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: config.max_payload_len,
        });
    }

    match config.mode {
        FrameMode::Direct => {
            for &byte in payload {
                sink.write_byte(byte)?;
            }
        }
        FrameMode::Delimited => {
            // max_payload_len <= 255 is enforced by FrameConfig::validate
            let len = u8::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
                size: payload.len(),
                max: u8::MAX as usize,
            })?;

            sink.write_byte(DELIMITER)?;
            write_escaped(sink, len)?;

            let mut crc = CRC_SEED;
            for &byte in payload {
                crc = checksum::step(byte, crc);
                write_escaped(sink, byte)?;
            }

            for byte in checksum::to_wire(crc) {
                write_escaped(sink, byte)?;
            }
            trace!(len = payload.len(), crc, "encoded delimited frame");
        }
    }

    Ok(())
}

/// Encode a single frame into a fresh buffer.
pub fn encode_to_vec(config: &FrameConfig, payload: &[u8]) -> Result<Vec<u8>> {
    let mut wire = Vec::with_capacity(max_packet_len(config.mode, payload.len()));
    encode_frame(config, payload, &mut wire)?;
    Ok(wire)
}

fn write_escaped<W>(sink: &mut W, byte: u8) -> Result<()>
where
    W: ByteSink + ?Sized,
{
    if byte == DELIMITER {
        sink.write_byte(DELIMITER)?;
    }
    sink.write_byte(byte)?;
    Ok(())
}
