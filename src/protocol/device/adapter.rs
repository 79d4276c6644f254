//! Foreground loop of the adapter.
//!
//! Each iteration feeds the watchdog, handles at most one completed telegram,
//! refreshes the status LEDs from the tick counter, and polls the CAN bridge.
//! Nothing in the loop blocks; the only waits are the short critical sections
//! inside [`SerialLink`].

use crate::core::TelegramBytes;
use crate::infra::store::ConfigStore;
use crate::protocol::device::can_bridge::{CanBridge, PassThrough};
use crate::protocol::device::config::Settings;
use crate::protocol::device::interpreter::{self, Outcome};
use crate::protocol::device::link::SerialLink;
use crate::protocol::transport::traits::board::{Board, StatusLed};
use crate::protocol::transport::traits::can_controller::CanController;
use crate::protocol::transport::traits::serial_port::SerialPort;
use crate::protocol::transport::traits::timeout_timer::TimeoutTimer;
use crate::protocol::transport::{LED_OBD_RX_TICK_MASK, LED_OBD_TX_TICK_MASK};

/// Foreground state: everything not touched by interrupts.
pub struct Adapter<'a, S, T, E, C, H, B>
where
    S: SerialPort,
    T: TimeoutTimer,
    E: ConfigStore,
    C: CanController,
    H: PassThrough,
    B: Board,
{
    link: &'a SerialLink<S, T>,
    settings: Settings<E>,
    can: CanBridge<C, H>,
    board: B,
    /// Scratch copy of the last telegram, edited in place into the reply.
    telegram: TelegramBytes,
}

impl<'a, S, T, E, C, H, B> Adapter<'a, S, T, E, C, H, B>
where
    S: SerialPort,
    T: TimeoutTimer,
    E: ConfigStore,
    C: CanController,
    H: PassThrough,
    B: Board,
{
    pub fn new(link: &'a SerialLink<S, T>, store: E, controller: C, hook: H, board: B) -> Self {
        Self {
            link,
            settings: Settings::new(store),
            can: CanBridge::new(controller, hook),
            board,
            telegram: TelegramBytes::new(),
        }
    }

    /// Power-up sequence: all LEDs lit, settings loaded, CAN configured,
    /// watchdog armed.
    pub fn start(&mut self) {
        for led in StatusLed::ALL {
            self.board.set_led(led, false);
        }

        let can_mode = self.settings.load().can_mode;
        #[cfg(feature = "defmt")]
        defmt::info!("Adapter start, CAN mode {=u8}", can_mode);

        if let Err(_err) = self.can.configure(can_mode) {
            #[cfg(feature = "defmt")]
            defmt::error!("CAN setup failed, bridge disabled");
        }

        self.board.enable_watchdog();
    }

    /// One pass of the foreground loop. Returns the outcome of the telegram
    /// handled during this pass, if there was one.
    pub fn poll(&mut self) -> Option<Outcome> {
        self.board.feed_watchdog();

        let outcome = if self.link.take_telegram(&mut self.telegram) {
            Some(self.handle_telegram())
        } else {
            None
        };

        let ticks = self.link.ticks();
        self.board
            .set_led(StatusLed::ObdRx, ticks & LED_OBD_RX_TICK_MASK != 0);
        self.board
            .set_led(StatusLed::ObdTx, ticks & LED_OBD_TX_TICK_MASK != 0);

        if let Err(_err) = self.can.poll() {
            #[cfg(feature = "defmt")]
            defmt::warn!("CAN poll failed");
        }

        outcome
    }

    /// [`Self::start`], then [`Self::poll`] forever.
    pub fn run(&mut self) -> ! {
        self.start();
        loop {
            self.poll();
        }
    }

    fn handle_telegram(&mut self) -> Outcome {
        let outcome = interpreter::execute(
            self.telegram.as_mut_slice(),
            &mut self.settings,
            &mut self.can,
            &mut self.board,
        );

        match outcome {
            Outcome::Reply => {
                if let Err(_err) = self.link.send(self.telegram.as_slice()) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Reply dropped: {}", defmt::Display2Format(&_err));
                }
            }
            Outcome::Silent => {}
            Outcome::Reset => self.board.reset(),
            Outcome::NotHandled => {
                if let Err(_err) = self.can.forward(self.telegram.as_slice()) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Forwarding to CAN failed");
                }
            }
        }
        outcome
    }

    //==================================================================================Accessors
    pub fn link(&self) -> &'a SerialLink<S, T> {
        self.link
    }

    pub fn settings(&self) -> &Settings<E> {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings<E> {
        &mut self.settings
    }

    pub fn can(&self) -> &CanBridge<C, H> {
        &self.can
    }

    pub fn can_mut(&mut self) -> &mut CanBridge<C, H> {
        &mut self.can
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }
}
