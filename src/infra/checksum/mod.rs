//! 8-bit additive checksum used by the serial telegram framing.

/// Wrapping sum of every byte in `bytes`.
#[inline]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Overwrite the last byte of `telegram` with the checksum of the preceding
/// bytes. Does nothing on an empty slice.
pub fn seal(telegram: &mut [u8]) {
    if let Some((last, body)) = telegram.split_last_mut() {
        *last = checksum(body);
    }
}
