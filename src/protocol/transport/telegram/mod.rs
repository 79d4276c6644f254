//! Telegram length rule.
//!
//! The first byte carries the payload length in its low six bits. A zero
//! there selects the extended form, where byte 3 holds the payload length:
//!
//! ```text
//! short:    [fmt|len] [b1] [b2] [data ... len bytes] [cs]   total = len + 4
//! extended: [fmt|0]   [b1] [b2] [len] [data ...]      [cs]  total = byte3 + 5
//! ```
use crate::core::RECEIVE_BUFFER_SIZE;

/// Number of bytes needed before the declared length is known.
pub const HEADER_LEN: usize = 4;

/// Bits of byte 0 holding the short-form payload length.
pub const LENGTH_MASK: u8 = 0x3F;

/// Longest telegram the encoding can declare (extended form, `byte3 = 0xFF`).
pub const MAX_TELEGRAM_LEN: usize = 0xFF + 5;

const _: () = assert!(MAX_TELEGRAM_LEN <= RECEIVE_BUFFER_SIZE);

/// Total telegram length (header, payload, and checksum) from byte 0 and byte 3.
#[inline]
pub const fn total_length(format: u8, extended_len: u8) -> usize {
    match format & LENGTH_MASK {
        0 => extended_len as usize + 5,
        payload_len => payload_len as usize + 4,
    }
}

/// Declared total length, or `None` until [`HEADER_LEN`] bytes are available.
#[inline]
pub fn declared_length(header: &[u8]) -> Option<usize> {
    if header.len() < HEADER_LEN {
        return None;
    }
    Some(total_length(header[0], header[3]))
}
