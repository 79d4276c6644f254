//! `elm-can-adapter` library: firmware core of a serial-to-CAN diagnostic
//! adapter in a `no_std` environment. The crate exposes the infrastructure
//! modules (checksum, persistent store), the serial transport (telegram
//! framing, transmit queue, peripheral traits), and the device logic (command
//! interpreter, persisted settings, CAN bridge, interrupt and foreground loops).
#![no_std]
//==================================================================================
/// Buffer sizes and the fixed-capacity telegram buffer shared by every layer.
pub mod core;
/// Link, configuration, and CAN errors.
pub mod error;
/// Checksum helper and non-volatile store abstraction.
pub mod infra;
/// Serial transport and device logic.
pub mod protocol;
//==================================================================================
