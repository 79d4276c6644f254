//! Receive framer: assembles telegrams from bytes delivered one at a time by
//! the receive interrupt and validates the trailing checksum.
//!
//! The framer is a plain state machine. Sharing it with the foreground and
//! driving the timeout timer is the job of
//! [`SerialLink`](crate::protocol::device::link::SerialLink).
use crate::core::RECEIVE_BUFFER_SIZE;
use crate::error::ReceiveError;
use crate::protocol::transport::telegram::declared_length;

//==================================================================================Enums and Structs
/// Receiver state shared between the interrupt and foreground contexts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReceiverState {
    /// Waiting for the first byte of a telegram.
    Idle,
    /// Telegram in progress.
    Receiving,
    /// Complete, valid telegram waiting for the foreground.
    Done,
    /// Complete telegram with a bad checksum; cleared by the timeout.
    Error,
}

/// What happened to a byte fed to the framer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The byte opened a new telegram.
    Started,
    /// The byte was absorbed, more are expected.
    InProgress,
    /// The byte completed a telegram with a valid checksum.
    Complete,
    /// A finished telegram is pending (`Done` or `Error`); the byte was dropped.
    Ignored,
}

/// Telegram assembly state and buffer.
#[derive(Debug, Clone)]
pub struct Framer {
    state: ReceiverState,
    buffer: [u8; RECEIVE_BUFFER_SIZE],
    /// Bytes actually stored (capped at the buffer capacity).
    stored: usize,
    /// Bytes received for the current telegram, stored or not.
    received: usize,
    /// Sum of every byte received so far except the latest one.
    checksum: u8,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    pub const fn new() -> Self {
        Self {
            state: ReceiverState::Idle,
            buffer: [0; RECEIVE_BUFFER_SIZE],
            stored: 0,
            received: 0,
            checksum: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Bytes buffered for the current telegram.
    #[inline]
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[..self.stored]
    }

    //==================================================================================Feed
    /// Advance the state machine with one received byte.
    ///
    /// Bytes past the buffer capacity are dropped but still counted, so an
    /// oversized telegram still ends on the checksum comparison instead of
    /// hanging in `Receiving`.
    pub fn feed(&mut self, byte: u8) -> Result<FeedOutcome, ReceiveError> {
        match self.state {
            ReceiverState::Idle => {
                self.buffer[0] = byte;
                self.stored = 1;
                self.received = 1;
                self.checksum = byte;
                self.state = ReceiverState::Receiving;
                Ok(FeedOutcome::Started)
            }
            ReceiverState::Receiving => {
                if self.stored < RECEIVE_BUFFER_SIZE {
                    self.buffer[self.stored] = byte;
                    self.stored += 1;
                }
                self.received = self.received.saturating_add(1);

                if let Some(declared) = declared_length(self.buffered()) {
                    if self.received >= declared {
                        if self.checksum != byte {
                            self.state = ReceiverState::Error;
                            return Err(ReceiveError::ChecksumMismatch {
                                computed: self.checksum,
                                received: byte,
                            });
                        }
                        self.state = ReceiverState::Done;
                        return Ok(FeedOutcome::Complete);
                    }
                }

                self.checksum = self.checksum.wrapping_add(byte);
                Ok(FeedOutcome::InProgress)
            }
            ReceiverState::Done | ReceiverState::Error => Ok(FeedOutcome::Ignored),
        }
    }

    //==================================================================================Foreground
    /// Length of the completed telegram, `None` unless the state is `Done`.
    #[inline]
    pub fn completed_len(&self) -> Option<usize> {
        match self.state {
            ReceiverState::Done => Some(self.stored),
            _ => None,
        }
    }

    /// Copy the stored bytes starting at `offset` into `out`, filling it
    /// entirely. Nothing is copied if the range runs past the stored bytes.
    ///
    /// The buffer stays stable while `Done`, so a telegram can be copied out
    /// over several calls.
    pub fn copy_chunk(&self, offset: usize, out: &mut [u8]) -> bool {
        match self.buffered().get(offset..offset + out.len()) {
            Some(chunk) => {
                out.copy_from_slice(chunk);
                true
            }
            None => false,
        }
    }

    /// Hand the buffer back to the receive side: `Done` becomes `Idle`.
    /// Returns `false` in any other state.
    pub fn release(&mut self) -> bool {
        if self.state != ReceiverState::Done {
            return false;
        }
        self.state = ReceiverState::Idle;
        true
    }

    //==================================================================================Timeout
    /// Abandon a telegram in progress or a failed one.
    ///
    /// Returns `true` when something was discarded. `Idle` and `Done` are kept.
    pub fn expire(&mut self) -> bool {
        match self.state {
            ReceiverState::Receiving | ReceiverState::Error => {
                self.state = ReceiverState::Idle;
                self.stored = 0;
                self.received = 0;
                true
            }
            ReceiverState::Idle | ReceiverState::Done => false,
        }
    }
}
