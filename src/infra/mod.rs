//! Infrastructure shared by the transport and device layers: the telegram
//! checksum and the non-volatile store abstraction.
pub mod checksum;
pub mod store;
