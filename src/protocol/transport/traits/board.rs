//! Board-level services used by the foreground loop.

/// Status LEDs wired on the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLed {
    SerialRx,
    SerialTx,
    ObdRx,
    ObdTx,
}

impl StatusLed {
    pub const ALL: [StatusLed; 4] = [
        StatusLed::SerialRx,
        StatusLed::SerialTx,
        StatusLed::ObdRx,
        StatusLed::ObdTx,
    ];
}

/// LEDs, watchdog, and reset control.
pub trait Board {
    /// Drive the LED output pin. The LEDs are wired active low: `false` lights them.
    fn set_led(&mut self, led: StatusLed, high: bool);
    /// Start the watchdog. It cannot be stopped once enabled.
    fn enable_watchdog(&mut self);
    /// Clear the watchdog counter.
    fn feed_watchdog(&mut self);
    /// Software reset. Never returns on hardware.
    fn reset(&mut self);
    /// Level of the ignition sense input.
    fn ignition_state(&mut self) -> bool {
        false
    }
}
