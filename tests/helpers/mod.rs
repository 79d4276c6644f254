//! Simulated peripherals standing in for the UART, timeout timer, CAN
//! controller, and board during integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;

use elm_can_adapter::error::LineError;
use elm_can_adapter::infra::checksum::checksum;
use elm_can_adapter::infra::store::RamStore;
use elm_can_adapter::protocol::device::adapter::Adapter;
use elm_can_adapter::protocol::device::can_bridge::{BitTiming, CounterEcho, PassThrough};
use elm_can_adapter::protocol::device::interpreter::Outcome;
use elm_can_adapter::protocol::device::link::{Irq, Priority, SerialLink};
use elm_can_adapter::protocol::transport::can_frame::CanFrame;
use elm_can_adapter::protocol::transport::traits::{
    board::{Board, StatusLed},
    can_controller::CanController,
    serial_port::SerialPort,
    timeout_timer::TimeoutTimer,
};
use embassy_time::Duration;
use embedded_can::{ErrorKind, StandardId};

//==================================================================================UART
#[derive(Debug, Default)]
/// UART with an input queue fed by the test and a captured output wire.
pub struct SimSerial {
    pub rx: VecDeque<Result<u8, LineError>>,
    pub wire: Vec<u8>,
    pub tx_interrupt: bool,
    pub receiver_restarts: usize,
}

impl SerialPort for SimSerial {
    fn read(&mut self) -> Result<u8, LineError> {
        self.rx.pop_front().unwrap_or(Err(LineError::Overrun))
    }

    fn restart_receiver(&mut self) {
        self.receiver_restarts += 1;
    }

    fn write(&mut self, byte: u8) {
        self.wire.push(byte);
    }

    fn set_transmit_interrupt(&mut self, enabled: bool) {
        self.tx_interrupt = enabled;
    }
}

//==================================================================================Timer
#[derive(Debug, Default)]
/// One-shot timer that only records what it was asked to do. Expiry is
/// simulated by dispatching [`Irq::RxTimeout`].
pub struct SimTimer {
    pub running: bool,
    pub restarts: usize,
    pub last_timeout: Option<Duration>,
}

impl TimeoutTimer for SimTimer {
    fn restart(&mut self, timeout: Duration) {
        self.running = true;
        self.restarts += 1;
        self.last_timeout = Some(timeout);
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

pub type SimLink = SerialLink<SimSerial, SimTimer>;

pub fn new_link() -> SimLink {
    SerialLink::new(SimSerial::default(), SimTimer::default())
}

//==================================================================================CAN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCanError;

impl embedded_can::Error for SimCanError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Default)]
/// CAN controller with an inbox and a log of transmitted frames.
pub struct SimCan {
    pub inbox: VecDeque<CanFrame>,
    pub sent: Vec<CanFrame>,
    pub opened: Option<(BitTiming, [StandardId; 2])>,
    pub open_count: usize,
    pub close_count: usize,
}

impl embedded_can::nb::Can for SimCan {
    type Frame = CanFrame;
    type Error = SimCanError;

    fn transmit(&mut self, frame: &CanFrame) -> nb::Result<Option<CanFrame>, SimCanError> {
        self.sent.push(*frame);
        Ok(None)
    }

    fn receive(&mut self) -> nb::Result<CanFrame, SimCanError> {
        self.inbox.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl CanController for SimCan {
    fn open(&mut self, timing: &BitTiming, filters: &[StandardId; 2]) -> Result<(), SimCanError> {
        self.opened = Some((*timing, *filters));
        self.open_count += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.opened = None;
        self.close_count += 1;
    }
}

//==================================================================================Board
#[derive(Debug, Default)]
pub struct SimBoard {
    /// Output level per LED, `None` until first driven.
    pub leds: [Option<bool>; 4],
    pub watchdog_enabled: bool,
    pub watchdog_feeds: usize,
    pub resets: usize,
    pub ignition: bool,
}

impl SimBoard {
    pub fn led(&self, led: StatusLed) -> Option<bool> {
        self.leds[led_index(led)]
    }
}

fn led_index(led: StatusLed) -> usize {
    match led {
        StatusLed::SerialRx => 0,
        StatusLed::SerialTx => 1,
        StatusLed::ObdRx => 2,
        StatusLed::ObdTx => 3,
    }
}

impl Board for SimBoard {
    fn set_led(&mut self, led: StatusLed, high: bool) {
        self.leds[led_index(led)] = Some(high);
    }

    fn enable_watchdog(&mut self) {
        self.watchdog_enabled = true;
    }

    fn feed_watchdog(&mut self) {
        self.watchdog_feeds += 1;
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn ignition_state(&mut self) -> bool {
        self.ignition
    }
}

//==================================================================================Wire helpers
/// Append the checksum to `body`.
pub fn telegram(body: &[u8]) -> Vec<u8> {
    let mut bytes = body.to_vec();
    bytes.push(checksum(body));
    bytes
}

/// Deliver `bytes` one receive interrupt at a time.
pub fn inject(link: &SimLink, bytes: &[u8]) {
    for &byte in bytes {
        link.with_serial(|serial| serial.rx.push_back(Ok(byte)));
        link.dispatch(Priority::High, |irq| irq == Irq::Receive);
    }
}

/// Deliver a line fault through the receive interrupt.
pub fn inject_fault(link: &SimLink, fault: LineError) {
    link.with_serial(|serial| serial.rx.push_back(Err(fault)));
    link.dispatch(Priority::High, |irq| irq == Irq::Receive);
}

/// Fire the receive timeout.
pub fn expire(link: &SimLink) {
    link.dispatch(Priority::High, |irq| irq == Irq::RxTimeout);
}

/// Run transmit-ready interrupts while armed and return what reached the wire.
pub fn drain_wire(link: &SimLink) -> Vec<u8> {
    while link.with_serial(|serial| serial.tx_interrupt) {
        link.dispatch(Priority::High, |irq| irq == Irq::TransmitReady);
    }
    link.with_serial(|serial| std::mem::take(&mut serial.wire))
}

pub fn can_frame(raw_id: u16, data: &[u8]) -> CanFrame {
    CanFrame::with_data(StandardId::new(raw_id).unwrap(), data).unwrap()
}

//==================================================================================Adapter rig
pub type SimAdapter<'a, H> = Adapter<'a, SimSerial, SimTimer, RamStore<16>, SimCan, H, SimBoard>;

pub fn new_adapter(link: &SimLink, store: RamStore<16>) -> SimAdapter<'_, CounterEcho> {
    Adapter::new(
        link,
        store,
        SimCan::default(),
        CounterEcho::new(),
        SimBoard::default(),
    )
}

/// Deliver `request`, run one foreground pass, and collect the reply bytes.
pub fn exchange<H: PassThrough>(
    adapter: &mut SimAdapter<'_, H>,
    request: &[u8],
) -> (Option<Outcome>, Vec<u8>) {
    let link = adapter.link();
    inject(link, request);
    let outcome = adapter.poll();
    (outcome, drain_wire(link))
}
