//! Serial link shared by the interrupt handlers and the foreground loop.
//!
//! All state touched from more than one context lives here, each piece in its
//! own critical-section cell:
//!
//! * the receive framer, written by the receive and timeout interrupts, and
//!   cleared by the foreground once it took a completed telegram;
//! * the transmit queue, filled by the foreground and drained by the
//!   transmit-ready interrupt;
//! * the UART and the timeout timer registers;
//! * the 10 ms status tick counter.
//!
//! Firmware places one [`SerialLink`] in a `static` (or a `StaticCell`),
//! forwards each interrupt vector to [`SerialLink::dispatch`], and hands a
//! reference to the foreground [`Adapter`](crate::protocol::device::adapter::Adapter).
//! No lock is held for more than a fixed amount of work. A completed telegram
//! is copied out [`TAKE_CHUNK_LEN`] bytes per critical section; the framer
//! ignores input while `Done`, so the buffer cannot change in between.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::core::{TelegramBytes, SEND_BUFFER_SIZE};
use crate::error::{ReceiveError, TransmitError};
use crate::protocol::transport::framer::{FeedOutcome, Framer, ReceiverState};
use crate::protocol::transport::traits::serial_port::SerialPort;
use crate::protocol::transport::traits::timeout_timer::TimeoutTimer;
use crate::protocol::transport::tx_queue::TxQueue;
use crate::protocol::transport::RX_TIMEOUT;

/// Bytes copied out of the framer per critical section by
/// [`SerialLink::take_telegram`].
pub const TAKE_CHUNK_LEN: usize = 16;

//==================================================================================Interrupt table
/// Interrupt priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Low,
}

/// Interrupt sources serviced by the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Irq {
    /// UART byte received (or line fault).
    Receive,
    /// UART transmit register empty.
    TransmitReady,
    /// Inter-byte timeout timer expired.
    RxTimeout,
    /// Status tick, every [`TICK_PERIOD_MS`](crate::protocol::transport::TICK_PERIOD_MS).
    Tick,
}

impl Irq {
    /// Service order within a priority level.
    pub const TABLE: [Irq; 4] = [Irq::Receive, Irq::TransmitReady, Irq::RxTimeout, Irq::Tick];

    pub const fn priority(self) -> Priority {
        match self {
            Irq::Receive | Irq::TransmitReady | Irq::RxTimeout => Priority::High,
            Irq::Tick => Priority::Low,
        }
    }
}

//==================================================================================SerialLink
pub struct SerialLink<S: SerialPort, T: TimeoutTimer> {
    framer: Mutex<CriticalSectionRawMutex, RefCell<Framer>>,
    tx: TxQueue<SEND_BUFFER_SIZE>,
    serial: Mutex<CriticalSectionRawMutex, RefCell<S>>,
    timer: Mutex<CriticalSectionRawMutex, RefCell<T>>,
    tick: Mutex<CriticalSectionRawMutex, Cell<u8>>,
}

impl<S: SerialPort, T: TimeoutTimer> SerialLink<S, T> {
    pub const fn new(serial: S, timer: T) -> Self {
        Self {
            framer: Mutex::new(RefCell::new(Framer::new())),
            tx: TxQueue::new(),
            serial: Mutex::new(RefCell::new(serial)),
            timer: Mutex::new(RefCell::new(timer)),
            tick: Mutex::new(Cell::new(0)),
        }
    }

    //==================================================================================Dispatch
    /// Service the first pending source of `level`, in [`Irq::TABLE`] order.
    ///
    /// Only one source is handled per call, like a vector that returns after
    /// each flag; the hardware re-enters while others remain pending.
    pub fn dispatch(&self, level: Priority, pending: impl Fn(Irq) -> bool) -> Option<Irq> {
        let irq = Irq::TABLE
            .into_iter()
            .find(|irq| irq.priority() == level && pending(*irq))?;
        self.service(irq);
        Some(irq)
    }

    /// Run the handler for `irq`.
    pub fn service(&self, irq: Irq) {
        match irq {
            Irq::Receive => {
                if let Err(_err) = self.on_receive() {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Receive dropped: {}", defmt::Display2Format(&_err));
                }
            }
            Irq::TransmitReady => {
                self.on_transmit_ready();
            }
            Irq::RxTimeout => {
                if self.on_rx_timeout() {
                    #[cfg(feature = "defmt")]
                    defmt::debug!(
                        "Receive dropped: {}",
                        defmt::Display2Format(&ReceiveError::Timeout)
                    );
                }
            }
            Irq::Tick => self.on_tick(),
        }
    }

    //==================================================================================Handlers
    /// Receive interrupt: read the byte, refresh the timeout, feed the framer.
    ///
    /// A line fault restarts the receiver and drops the byte without touching
    /// the framer or the timer.
    pub fn on_receive(&self) -> Result<FeedOutcome, ReceiveError> {
        let byte = self.serial.lock(|serial| {
            let mut serial = serial.borrow_mut();
            let read = serial.read();
            if read.is_err() {
                serial.restart_receiver();
            }
            read
        })?;

        self.timer
            .lock(|timer| timer.borrow_mut().restart(RX_TIMEOUT));

        let outcome = self.framer.lock(|framer| framer.borrow_mut().feed(byte));
        if let Ok(FeedOutcome::Complete) = outcome {
            self.timer.lock(|timer| timer.borrow_mut().stop());
        }
        outcome
    }

    /// Transmit-ready interrupt: hand one byte to the UART, or disarm when
    /// the queue is empty. Returns whether a byte was written.
    ///
    /// The dequeue runs inside the UART section so an empty check and the
    /// disarm cannot straddle a concurrent [`Self::send`].
    pub fn on_transmit_ready(&self) -> bool {
        self.serial.lock(|serial| {
            let mut serial = serial.borrow_mut();
            match self.tx.dequeue() {
                Some(byte) => {
                    serial.write(byte);
                    true
                }
                None => {
                    serial.set_transmit_interrupt(false);
                    false
                }
            }
        })
    }

    /// Timeout interrupt: stop the timer and drop a telegram in progress or a
    /// failed one. Returns whether something was discarded.
    pub fn on_rx_timeout(&self) -> bool {
        self.timer.lock(|timer| timer.borrow_mut().stop());
        self.framer.lock(|framer| framer.borrow_mut().expire())
    }

    /// Status tick interrupt.
    pub fn on_tick(&self) {
        self.tick.lock(|tick| tick.set(tick.get().wrapping_add(1)));
    }

    //==================================================================================Foreground
    /// Take a completed telegram, returning the receiver to `Idle`.
    ///
    /// Returns `false` (leaving `out` untouched) when nothing is pending.
    pub fn take_telegram(&self, out: &mut TelegramBytes) -> bool {
        let Some(len) = self.framer.lock(|framer| framer.borrow().completed_len()) else {
            return false;
        };

        let mut offset = 0;
        while offset < len {
            let end = (offset + TAKE_CHUNK_LEN).min(len);
            self.framer
                .lock(|framer| framer.borrow().copy_chunk(offset, &mut out.data[offset..end]));
            offset = end;
        }
        out.len = len;

        self.framer.lock(|framer| framer.borrow_mut().release())
    }

    /// Queue `bytes` for transmission and arm the transmit interrupt.
    ///
    /// On overflow nothing is queued; the caller drops the response.
    pub fn send(&self, bytes: &[u8]) -> Result<(), TransmitError> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.tx.enqueue(bytes)?;
        self.serial
            .lock(|serial| serial.borrow_mut().set_transmit_interrupt(true));
        Ok(())
    }

    pub fn receiver_state(&self) -> ReceiverState {
        self.framer.lock(|framer| framer.borrow().state())
    }

    /// Bytes waiting in the transmit queue.
    pub fn pending_output(&self) -> usize {
        self.tx.queued()
    }

    /// Current value of the 10 ms tick counter.
    pub fn ticks(&self) -> u8 {
        self.tick.lock(|tick| tick.get())
    }

    /// Run `f` on the UART inside a critical section.
    pub fn with_serial<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.serial.lock(|serial| f(&mut serial.borrow_mut()))
    }

    /// Run `f` on the timeout timer inside a critical section.
    pub fn with_timer<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.timer.lock(|timer| f(&mut timer.borrow_mut()))
    }
}
