//! CRC16 used by the UHF Prime frame format
//!
//! Reflected CRC-16 (polynomial 0x8408, initial value 0xFFFF, no final XOR).
//! The checksum covers every byte of a frame except the trailing two, and is
//! transmitted big-endian.

use tracing::trace;

/// Reflected polynomial
pub const POLYNOMIAL: u16 = 0x8408;

/// Register preset
pub const INITIAL: u16 = 0xFFFF;

/// Calculate the frame CRC16
///
/// # Algorithm
///
/// ```text
/// crc = 0xFFFF
/// for each byte:
///     crc ^= byte
///     repeat 8 times:
///         if crc & 1: crc = (crc >> 1) ^ 0x8408
///         else:       crc = crc >> 1
/// ```
///
/// # Examples
///
/// ```
/// use uhfprime_core::crc;
///
/// let crc = crc::calculate(&[0xCF, 0xFF, 0x00, 0x72, 0x00]);
/// assert_eq!(crc, 0x17A5);
/// ```
pub fn calculate(data: &[u8]) -> u16 {
    let mut crc = INITIAL;

    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            let lsb = crc & 0x0001 != 0;
            crc >>= 1;
            if lsb {
                crc ^= POLYNOMIAL;
            }
        }
    }

    trace!(len = data.len(), crc, "Calculated CRC16");

    crc
}

/// Verify CRC
pub fn verify(data: &[u8], expected: u16) -> bool {
    calculate(data) == expected
}
