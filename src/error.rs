//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (serial line faults, framing,
//! transmit backpressure, persistent store access, CAN transceiver).
use thiserror_no_std::Error;

//==================================================================================LINK_ERRORS
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Faults flagged by the UART alongside a received byte.
pub enum LineError {
    /// Stop bit not found where expected.
    #[error("Framing error")]
    Framing,
    /// A byte arrived before the previous one was read.
    #[error("Receive overrun")]
    Overrun,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Reasons a telegram in progress was discarded by the receive side.
///
/// None of these are answered on the wire; the peer sees a missing response.
pub enum ReceiveError {
    /// Hardware line fault; the receiver was restarted and the byte dropped.
    #[error("Line error: {0}")]
    Line(#[from] LineError),
    /// Telegram fully received but its trailing checksum does not match.
    #[error("Checksum mismatch: computed {computed:#04x}, received {received:#04x}")]
    ChecksumMismatch { computed: u8, received: u8 },
    /// The peer stopped sending in the middle of a telegram.
    #[error("Inter-byte timeout")]
    Timeout,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Transmit queue backpressure.
pub enum TransmitError {
    /// The bytes do not fit next to what is already queued. Nothing was enqueued.
    #[error("Send buffer overflow -> queued: {queued}, requested: {requested}, capacity: {capacity}")]
    Overflow {
        queued: usize,
        requested: usize,
        capacity: usize,
    },
}

//==================================================================================CONFIG_ERRORS
#[derive(Error, Debug)]
/// Failures while accessing the non-volatile configuration store.
pub enum ConfigError<E: core::fmt::Debug> {
    /// Reading a stored byte failed.
    #[error("Store read error at {address:#04x}: {error:?}")]
    Read { address: u8, error: E },
    /// Writing a byte failed.
    #[error("Store write error at {address:#04x}: {error:?}")]
    Write { address: u8, error: E },
}

//==================================================================================CAN_ERRORS
#[derive(Error, Debug)]
/// Failures reported by the CAN transceiver.
pub enum CanBridgeError<E: core::fmt::Debug> {
    /// The controller rejected the bit timing or filter setup.
    #[error("CAN open error: {0:?}")]
    Open(E),
    /// The controller reported a fault while fetching a frame.
    #[error("CAN receive error: {0:?}")]
    Receive(E),
    /// A frame could not be queued for transmission.
    #[error("CAN transmit error: {0:?}")]
    Transmit(E),
    /// Every transmit mailbox is busy.
    #[error("CAN transmit mailboxes full")]
    WouldBlock,
}
