//! CAN controller abstraction. Frame traffic goes through the
//! [`embedded_can::nb::Can`] contract; this trait adds the bring-up the
//! bridge needs when the bit-rate setting changes.
use embedded_can::StandardId;

use crate::protocol::device::can_bridge::BitTiming;
use crate::protocol::transport::can_frame::CanFrame;

/// Non-blocking CAN controller with runtime bit-timing reconfiguration.
pub trait CanController: embedded_can::nb::Can<Frame = CanFrame> {
    /// Program `timing`, accept standard frames matching `filters`, and join
    /// the bus.
    fn open(&mut self, timing: &BitTiming, filters: &[StandardId; 2])
        -> Result<(), Self::Error>;
    /// Leave the bus and power the controller down.
    fn close(&mut self);
}
