//! Transmit ring buffer shared between the foreground (producer) and the
//! transmit-ready interrupt (consumer).
//!
//! Only the queued-length counter is meaningful to both sides. The producer
//! checks it once, stages bytes into free slots one short critical section at
//! a time, and publishes them with a single counter update. The consumer never
//! reads past the published count, so staged bytes are invisible until the
//! whole response is committed.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::error::TransmitError;

struct Ring<const N: usize> {
    buffer: [u8; N],
    /// Next slot the producer writes.
    head: usize,
    /// Next slot the consumer reads.
    tail: usize,
    /// Published bytes not yet handed to the UART.
    queued: usize,
}

impl<const N: usize> Ring<N> {
    const fn new() -> Self {
        Self {
            buffer: [0; N],
            head: 0,
            tail: 0,
            queued: 0,
        }
    }

    fn stage(&mut self, byte: u8) {
        self.buffer[self.head] = byte;
        self.head += 1;
        if self.head >= N {
            self.head = 0;
        }
    }

    fn pop(&mut self) -> Option<u8> {
        if self.queued == 0 {
            return None;
        }
        let byte = self.buffer[self.tail];
        self.tail += 1;
        if self.tail >= N {
            self.tail = 0;
        }
        self.queued -= 1;
        Some(byte)
    }
}

/// Fixed-capacity byte queue drained by the transmit interrupt.
pub struct TxQueue<const N: usize> {
    ring: Mutex<CriticalSectionRawMutex, RefCell<Ring<N>>>,
}

impl<const N: usize> Default for TxQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TxQueue<N> {
    pub const fn new() -> Self {
        Self {
            ring: Mutex::new(RefCell::new(Ring::new())),
        }
    }

    /// Total capacity in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes published and not yet consumed.
    pub fn queued(&self) -> usize {
        self.ring.lock(|ring| ring.borrow().queued)
    }

    pub fn is_empty(&self) -> bool {
        self.queued() == 0
    }

    //==================================================================================Producer
    /// Append all of `bytes`, or nothing.
    ///
    /// Must only be called from the single producer context. Arming the
    /// transmit interrupt is left to the caller.
    pub fn enqueue(&self, bytes: &[u8]) -> Result<(), TransmitError> {
        if bytes.is_empty() {
            return Ok(());
        }

        let queued = self.queued();
        if queued + bytes.len() > N {
            return Err(TransmitError::Overflow {
                queued,
                requested: bytes.len(),
                capacity: N,
            });
        }

        // The consumer only shrinks `queued`, so the slots checked above stay free.
        for &byte in bytes {
            self.ring.lock(|ring| ring.borrow_mut().stage(byte));
        }

        self.ring
            .lock(|ring| ring.borrow_mut().queued += bytes.len());
        Ok(())
    }

    //==================================================================================Consumer
    /// Take the oldest published byte, if any.
    pub fn dequeue(&self) -> Option<u8> {
        self.ring.lock(|ring| ring.borrow_mut().pop())
    }
}
