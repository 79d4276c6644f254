//! Peripheral abstractions the core is written against: UART, one-shot
//! timeout timer, CAN controller, and the board (LEDs, watchdog, reset).
//! Firmware implements them on top of its HAL; tests inject simulations.
pub mod board;
pub mod can_controller;
pub mod serial_port;
pub mod timeout_timer;
