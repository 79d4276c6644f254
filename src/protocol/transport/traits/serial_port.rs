//! UART seen from the interrupt handlers.
use crate::error::LineError;

/// Register-level operations on the serial peripheral.
///
/// Every method is called from interrupt context or inside a critical
/// section and must not block.
pub trait SerialPort {
    /// Fetch the byte that raised the receive interrupt, or the fault flagged
    /// with it.
    fn read(&mut self) -> Result<u8, LineError>;
    /// Clear sticky receive faults by cycling the receiver enable.
    fn restart_receiver(&mut self);
    /// Load one byte into the transmit register.
    fn write(&mut self, byte: u8);
    /// Enable or disable the transmit-ready interrupt.
    fn set_transmit_interrupt(&mut self, enabled: bool);
}
