//! CAN side of the adapter: applies the configured bus speed to the
//! controller and runs the pass-through hook on incoming traffic.
use embedded_can::StandardId;

use crate::error::CanBridgeError;
use crate::protocol::device::config::CanMode;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::traits::can_controller::CanController;

//==================================================================================BitTiming
/// Controller bit timing, in time quanta.
///
/// A bit lasts `1 + propagation_seg + phase_seg_1 + phase_seg_2` quanta; the
/// quantum length is set by `prescaler` relative to the controller clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    /// Synchronization jump width.
    pub sjw: u8,
    /// Baud-rate prescaler, as a clock divisor.
    pub prescaler: u8,
    pub propagation_seg: u8,
    pub phase_seg_1: u8,
    pub phase_seg_2: u8,
}

impl BitTiming {
    pub const KBIT_500: BitTiming = BitTiming {
        sjw: 1,
        prescaler: 2,
        propagation_seg: 1,
        phase_seg_1: 8,
        phase_seg_2: 6,
    };

    pub const KBIT_100: BitTiming = BitTiming {
        sjw: 1,
        prescaler: 4,
        propagation_seg: 3,
        phase_seg_1: 8,
        phase_seg_2: 8,
    };

    /// Time quanta in one bit time.
    pub fn time_quanta_per_bit(&self) -> u32 {
        1 + u32::from(self.propagation_seg)
            + u32::from(self.phase_seg_1)
            + u32::from(self.phase_seg_2)
    }

    /// Timing for `mode`, `None` when the bus is off.
    pub const fn for_mode(mode: CanMode) -> Option<BitTiming> {
        match mode {
            CanMode::Off => None,
            CanMode::Kbit500 => Some(Self::KBIT_500),
            CanMode::Kbit100 => Some(Self::KBIT_100),
        }
    }
}

const fn standard_id(raw: u16) -> StandardId {
    match StandardId::new(raw) {
        Some(id) => id,
        None => panic!("identifier exceeds 11 bits"),
    }
}

/// Acceptance filters programmed whenever the bus is enabled.
pub const ACCEPTANCE_FILTERS: [StandardId; 2] = [standard_id(0x600), standard_id(0x700)];

//==================================================================================PassThrough
/// Transform applied to traffic crossing the bridge.
pub trait PassThrough {
    /// Reply to put on the bus for a frame received from it, if any.
    fn can_reply(&mut self, frame: &CanFrame) -> Option<CanFrame>;
    /// CAN frame carrying a serial telegram that is not an adapter command.
    fn telegram_to_can(&mut self, telegram: &[u8]) -> Option<CanFrame>;
}

/// Bench hook: echoes every received frame with its first payload byte
/// replaced by a rolling counter. Serial telegrams are not forwarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterEcho {
    counter: u8,
}

impl CounterEcho {
    pub const fn new() -> Self {
        Self { counter: 0 }
    }
}

impl PassThrough for CounterEcho {
    fn can_reply(&mut self, frame: &CanFrame) -> Option<CanFrame> {
        let mut reply = *frame;
        reply.data[0] = self.counter;
        self.counter = self.counter.wrapping_add(1);
        Some(reply)
    }

    fn telegram_to_can(&mut self, _telegram: &[u8]) -> Option<CanFrame> {
        None
    }
}

//==================================================================================CanBridge
/// Controller plus its current enable state and the pass-through hook.
pub struct CanBridge<C: CanController, H: PassThrough> {
    controller: C,
    hook: H,
    mode: CanMode,
    enabled: bool,
}

impl<C: CanController, H: PassThrough> CanBridge<C, H> {
    /// The bridge starts disabled until the first [`Self::configure`].
    pub fn new(controller: C, hook: H) -> Self {
        Self {
            controller,
            hook,
            mode: CanMode::Off,
            enabled: false,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn mode(&self) -> CanMode {
        self.mode
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Apply the raw CAN mode byte: close the controller for `0`, otherwise
    /// program the matching timing and filters and enable it.
    ///
    /// The bridge stays disabled when the controller refuses the setup.
    pub fn configure(&mut self, raw_mode: u8) -> Result<(), CanBridgeError<C::Error>> {
        let mode = CanMode::from_raw(raw_mode);
        self.mode = mode;

        match BitTiming::for_mode(mode) {
            None => {
                #[cfg(feature = "defmt")]
                defmt::info!("CAN off");
                self.controller.close();
                self.enabled = false;
                Ok(())
            }
            Some(timing) => {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "CAN on: mode {=u8}, prescaler {=u8}, {=u32} tq/bit",
                    raw_mode,
                    timing.prescaler,
                    timing.time_quanta_per_bit()
                );
                self.enabled = false;
                self.controller
                    .open(&timing, &ACCEPTANCE_FILTERS)
                    .map_err(CanBridgeError::Open)?;
                self.enabled = true;
                Ok(())
            }
        }
    }

    /// Non-blocking check for an incoming frame; the hook's reply, if any,
    /// is transmitted. Returns whether a frame was received.
    pub fn poll(&mut self) -> Result<bool, CanBridgeError<C::Error>> {
        if !self.enabled {
            return Ok(false);
        }

        let frame = match self.controller.receive() {
            Ok(frame) => frame,
            Err(nb::Error::WouldBlock) => return Ok(false),
            Err(nb::Error::Other(err)) => return Err(CanBridgeError::Receive(err)),
        };

        #[cfg(feature = "defmt")]
        defmt::trace!("CAN rx id={=u16:#x} len={=usize}", frame.id.as_raw(), frame.len);

        if let Some(reply) = self.hook.can_reply(&frame) {
            self.transmit(&reply)?;
        }
        Ok(true)
    }

    /// Hand a non-command telegram to the hook. Returns whether a frame was sent.
    pub fn forward(&mut self, telegram: &[u8]) -> Result<bool, CanBridgeError<C::Error>> {
        if !self.enabled {
            return Ok(false);
        }
        match self.hook.telegram_to_can(telegram) {
            Some(frame) => {
                self.transmit(&frame)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn transmit(&mut self, frame: &CanFrame) -> Result<(), CanBridgeError<C::Error>> {
        match self.controller.transmit(frame) {
            // A displaced lower-priority frame is dropped; this bridge keeps no TX backlog.
            Ok(_displaced) => Ok(()),
            Err(nb::Error::WouldBlock) => Err(CanBridgeError::WouldBlock),
            Err(nb::Error::Other(err)) => Err(CanBridgeError::Transmit(err)),
        }
    }
}
