//! Adapter logic on top of the transport: persisted settings, the command
//! interpreter, the CAN bridge, the interrupt-shared serial link, and the
//! foreground loop tying them together.
pub mod adapter;
pub mod can_bridge;
pub mod config;
pub mod interpreter;
pub mod link;
