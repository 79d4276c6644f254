//! Sizes shared by the serial link and the interpreter, plus the
//! fixed-capacity telegram buffer handed from the receive side to the
//! foreground.

/// Receive buffer capacity: the largest telegram the length rule can declare
/// (`0xFF + 5`).
pub const RECEIVE_BUFFER_SIZE: usize = 260;

/// Transmit queue capacity: one full response plus pipelined output.
pub const SEND_BUFFER_SIZE: usize = 280;

/// Owned copy of one received telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelegramBytes {
    pub len: usize,
    pub data: [u8; RECEIVE_BUFFER_SIZE],
}

impl Default for TelegramBytes {
    fn default() -> Self {
        Self::new()
    }
}

impl TelegramBytes {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            len: 0,
            data: [0; RECEIVE_BUFFER_SIZE],
        }
    }

    /// Number of valid bytes stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy bytes into the buffer and update `len`. Input longer than the
    /// capacity is truncated.
    #[inline]
    pub fn copy_from_slice(&mut self, slice: &[u8]) {
        let clamped = slice.len().min(RECEIVE_BUFFER_SIZE);
        self.data[..clamped].copy_from_slice(&slice[..clamped]);
        self.len = clamped;
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Mutable view over the populated bytes; the interpreter edits replies in place.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }
}
