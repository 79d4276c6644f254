//! In-memory representation of a classic CAN frame with an 11-bit identifier.
use embedded_can::{Frame, Id, StandardId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Standard data or remote frame as exchanged with the transceiver.
pub struct CanFrame {
    /// 11-bit identifier.
    pub id: StandardId,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
    /// Remote transmission request.
    pub remote: bool,
}

impl CanFrame {
    /// Build a data frame; `None` when `data` exceeds eight bytes.
    pub fn with_data(id: StandardId, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            return None;
        }
        let mut buffer = [0u8; 8];
        buffer[..data.len()].copy_from_slice(data);
        Some(Self {
            id,
            data: buffer,
            len: data.len(),
            remote: false,
        })
    }
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Standard(id) => Self::with_data(id, data),
            Id::Extended(_) => None,
        }
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        match id.into() {
            Id::Standard(id) if dlc <= 8 => Some(Self {
                id,
                data: [0; 8],
                len: dlc,
                remote: true,
            }),
            _ => None,
        }
    }

    fn is_extended(&self) -> bool {
        false
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        Id::Standard(self.id)
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..self.len]
        }
    }
}
