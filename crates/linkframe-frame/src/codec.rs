use std::fmt;
use std::str::FromStr;

use crate::checksum::CRC_LEN;
use crate::error::{FrameError, Result};

/// Reserved byte marking the start of a delimited frame.
pub const DELIMITER: u8 = 0x7E;

/// Default maximum payload length in bytes.
pub const MAX_PAYLOAD_LEN: usize = 8;

/// Delimiter bytes per frame in delimited mode.
pub const DELIMITER_LEN: usize = 1;

/// Length header bytes per frame in delimited mode.
pub const HEADER_LEN: usize = 1;

/// How frames are marked on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// The transport already frames messages (CAN). Payload bytes pass through
    /// verbatim and the caller's batch boundaries delimit messages.
    Direct,
    /// Raw byte stream (UART). Delimiter, length byte, escaped payload and a
    /// trailing CRC-16.
    #[default]
    Delimited,
}

impl FrameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameMode::Direct => "direct",
            FrameMode::Delimited => "delimited",
        }
    }
}

impl fmt::Display for FrameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameMode {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "can" => Ok(FrameMode::Direct),
            "delimited" | "uart" => Ok(FrameMode::Delimited),
            other => Err(FrameError::InvalidConfig(format!(
                "unknown frame mode {other:?} (expected direct or delimited)"
            ))),
        }
    }
}

/// Largest number of wire bytes one frame can occupy.
///
/// Delimited mode assumes the worst case where the length byte, every payload
/// byte and both checksum bytes equal the delimiter and are doubled.
pub fn max_packet_len(mode: FrameMode, max_payload: usize) -> usize {
    match mode {
        FrameMode::Direct => max_payload,
        FrameMode::Delimited => DELIMITER_LEN + 2 * (HEADER_LEN + max_payload + CRC_LEN),
    }
}

/// Configuration for a protocol handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Wire framing mode. Default: delimited.
    pub mode: FrameMode,
    /// Maximum payload accepted by `send_message`. Default: 8 bytes.
    pub max_payload_len: usize,
}

impl FrameConfig {
    pub fn new(mode: FrameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Check the configuration is usable.
    ///
    /// The length header is a single byte, so payloads above 255 bytes cannot
    /// be described on the wire.
    pub fn validate(&self) -> Result<()> {
        if self.max_payload_len == 0 {
            return Err(FrameError::InvalidConfig(
                "max_payload_len must be greater than zero".into(),
            ));
        }
        if self.max_payload_len > u8::MAX as usize {
            return Err(FrameError::InvalidConfig(format!(
                "max_payload_len {} exceeds the one-byte length header",
                self.max_payload_len
            )));
        }
        Ok(())
    }

    /// Worst-case wire size of one frame under this configuration.
    pub fn max_packet_len(&self) -> usize {
        max_packet_len(self.mode, self.max_payload_len)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            mode: FrameMode::Delimited,
            max_payload_len: MAX_PAYLOAD_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = FrameConfig::default();
        assert_eq!(cfg.mode, FrameMode::Delimited);
        assert_eq!(cfg.max_payload_len, 8);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_payload_limits() {
        let zero = FrameConfig {
            max_payload_len: 0,
            ..FrameConfig::default()
        };
        assert!(matches!(zero.validate(), Err(FrameError::InvalidConfig(_))));

        let wide = FrameConfig {
            max_payload_len: 256,
            ..FrameConfig::default()
        };
        assert!(matches!(wide.validate(), Err(FrameError::InvalidConfig(_))));

        let widest = FrameConfig {
            max_payload_len: 255,
            ..FrameConfig::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn packet_len_per_mode() {
        assert_eq!(max_packet_len(FrameMode::Direct, 8), 8);
        assert_eq!(max_packet_len(FrameMode::Delimited, 8), 23);
        assert_eq!(FrameConfig::new(FrameMode::Direct).max_packet_len(), 8);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("direct".parse::<FrameMode>().unwrap(), FrameMode::Direct);
        assert_eq!("CAN".parse::<FrameMode>().unwrap(), FrameMode::Direct);
        assert_eq!(
            " delimited ".parse::<FrameMode>().unwrap(),
            FrameMode::Delimited
        );
        assert_eq!("uart".parse::<FrameMode>().unwrap(), FrameMode::Delimited);
        assert!("slip".parse::<FrameMode>().is_err());
        assert_eq!(FrameMode::Direct.to_string(), "direct");
    }
}
