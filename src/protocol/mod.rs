//! Serial telegram transport and the adapter built on it.
pub mod device;
pub mod transport;
