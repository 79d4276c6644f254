//! Serial transport layer: telegram length rule, receive framer, transmit
//! queue, CAN frame representation, and the peripheral traits the link is
//! built on.
//!
//! ## Timing Constants
//!
//! The receive side is delimited purely by time: a telegram in progress is
//! abandoned when the peer pauses for longer than [`RX_TIMEOUT_MS`].

use embassy_time::Duration;

pub mod can_frame;
pub mod framer;
pub mod telegram;
pub mod traits;
pub mod tx_queue;

/// Maximum gap between two bytes of the same telegram (ms).
///
/// At 38400 baud one byte takes ~0.26 ms on the wire, so a 1 ms gap already
/// means the sender paused. The timer is dedicated to this supervision.
pub const RX_TIMEOUT_MS: u64 = 1;

/// [`RX_TIMEOUT_MS`] as a [`Duration`] handed to the timeout timer.
pub const RX_TIMEOUT: Duration = Duration::from_millis(RX_TIMEOUT_MS);

/// Period of the free-running status tick (ms). Only used for indication,
/// never for protocol timing.
pub const TICK_PERIOD_MS: u64 = 10;

/// Tick counter bit driving the OBD RX status LED (~320 ms period).
pub const LED_OBD_RX_TICK_MASK: u8 = 0x10;

/// Tick counter bit driving the OBD TX status LED (~640 ms period).
pub const LED_OBD_TX_TICK_MASK: u8 = 0x20;
