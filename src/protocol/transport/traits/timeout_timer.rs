//! One-shot hardware timer backing the receive timeout.
use embassy_time::Duration;

/// Restartable one-shot timer raising the receive-timeout interrupt.
pub trait TimeoutTimer {
    /// Reload the counter with `timeout` and start (or keep) it running.
    fn restart(&mut self, timeout: Duration);
    /// Stop the counter and clear any pending expiry.
    fn stop(&mut self);
}
