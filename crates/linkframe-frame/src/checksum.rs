//! CRC-16/CCITT-FALSE checksum shared by the encoder and the decoder.
//!
//! Both directions must go through [`step`]; any drift between them shows up
//! as every frame failing validation.

use crc::{Crc, CRC_16_IBM_3740};

/// Value every frame checksum starts from.
pub const CRC_SEED: u16 = 0xFFFF;

/// Number of checksum bytes on the wire.
pub const CRC_LEN: usize = 2;

/// Catalogue name of the algorithm, for diagnostics.
pub const ALGORITHM_NAME: &str = "CRC-16/CCITT-FALSE";

static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Fold one more byte into a running checksum.
pub fn step(byte: u8, running: u16) -> u16 {
    let mut digest = CRC16.digest_with_initial(running);
    digest.update(&[byte]);
    digest.finalize()
}

/// Checksum of `bytes`, starting from [`CRC_SEED`].
pub fn compute(bytes: &[u8]) -> u16 {
    bytes.iter().fold(CRC_SEED, |crc, &byte| step(byte, crc))
}

/// Wire order of a checksum: most significant byte first.
pub fn to_wire(crc: u16) -> [u8; CRC_LEN] {
    crc.to_be_bytes()
}
