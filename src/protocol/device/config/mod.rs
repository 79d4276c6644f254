//! Persisted adapter settings: store layout, compiled-in defaults, and the
//! load/write cycle that keeps the in-memory copy equal to what is stored.
//!
//! Each parameter occupies two cells, the value and its complement. A pair
//! that does not match (erased or corrupted store) loads the default instead.
use crate::error::ConfigError;
use crate::infra::store::{read_redundant, write_redundant, ConfigStore};

//==================================================================================Layout
/// Raw CAN mode value: bus off.
pub const CAN_MODE_OFF: u8 = 0;
/// Raw CAN mode value: 500 kbit/s.
pub const CAN_MODE_500K: u8 = 1;
/// Raw CAN mode value: 100 kbit/s.
pub const CAN_MODE_100K: u8 = 9;

pub const DEFAULT_CAN_MODE: u8 = CAN_MODE_500K;
/// Flow-control block size; 0 disables block-wise flow control.
pub const DEFAULT_BLOCK_SIZE: u8 = 0;
/// Minimum separation time between consecutive frames (ms).
pub const DEFAULT_SEPARATION_TIME: u8 = 0;
pub const DEFAULT_PLD_MODE: u8 = 0;

/// Persisted parameter, keyed by its store address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    CanMode,
    BlockSize,
    SeparationTime,
    /// Identification mode reported to diagnostic tools.
    PldMode,
}

impl Param {
    pub const ALL: [Param; 4] = [
        Param::CanMode,
        Param::BlockSize,
        Param::SeparationTime,
        Param::PldMode,
    ];

    /// Address of the value cell; the complement lives at `address + 1`.
    pub const fn address(self) -> u8 {
        match self {
            Param::CanMode => 0x00,
            Param::BlockSize => 0x02,
            Param::SeparationTime => 0x04,
            Param::PldMode => 0x06,
        }
    }

    pub const fn default_value(self) -> u8 {
        match self {
            Param::CanMode => DEFAULT_CAN_MODE,
            Param::BlockSize => DEFAULT_BLOCK_SIZE,
            Param::SeparationTime => DEFAULT_SEPARATION_TIME,
            Param::PldMode => DEFAULT_PLD_MODE,
        }
    }
}

//==================================================================================CanMode
/// Bus speed selected by the raw CAN mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanMode {
    Off,
    Kbit500,
    Kbit100,
}

impl CanMode {
    /// Unknown values fall back to 500 kbit/s, the most common diagnostic bus.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            CAN_MODE_OFF => CanMode::Off,
            CAN_MODE_100K => CanMode::Kbit100,
            _ => CanMode::Kbit500,
        }
    }
}

//==================================================================================AdapterConfig
/// In-memory copy of the persisted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Raw mode byte, echoed as stored even when it maps to the fallback speed.
    pub can_mode: u8,
    pub block_size: u8,
    pub separation_time: u8,
    pub pld_mode: u8,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            can_mode: DEFAULT_CAN_MODE,
            block_size: DEFAULT_BLOCK_SIZE,
            separation_time: DEFAULT_SEPARATION_TIME,
            pld_mode: DEFAULT_PLD_MODE,
        }
    }
}

impl AdapterConfig {
    pub fn get(&self, param: Param) -> u8 {
        match param {
            Param::CanMode => self.can_mode,
            Param::BlockSize => self.block_size,
            Param::SeparationTime => self.separation_time,
            Param::PldMode => self.pld_mode,
        }
    }

    fn set(&mut self, param: Param, value: u8) {
        match param {
            Param::CanMode => self.can_mode = value,
            Param::BlockSize => self.block_size = value,
            Param::SeparationTime => self.separation_time = value,
            Param::PldMode => self.pld_mode = value,
        }
    }

    #[inline]
    pub fn bitrate(&self) -> CanMode {
        CanMode::from_raw(self.can_mode)
    }
}

//==================================================================================Settings
/// Owns the store and the loaded configuration.
pub struct Settings<S: ConfigStore> {
    store: S,
    config: AdapterConfig,
}

impl<S: ConfigStore> Settings<S> {
    /// Wrap `store`. The configuration holds defaults until [`Self::load`] runs.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: AdapterConfig::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reload every parameter from the store.
    ///
    /// Never fails: an unreadable or inconsistent pair yields the default.
    pub fn load(&mut self) -> &AdapterConfig {
        for param in Param::ALL {
            let value = match read_redundant(&mut self.store, param.address()) {
                Ok(Some(value)) => value,
                Ok(None) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!(
                        "Param at {=u8:#x} inconsistent, using default",
                        param.address()
                    );
                    param.default_value()
                }
                Err(_err) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "Param at {=u8:#x} unreadable, using default",
                        param.address()
                    );
                    param.default_value()
                }
            };
            self.config.set(param, value);
        }
        &self.config
    }

    /// Persist `value` for `param`, then reload.
    ///
    /// The reload happens even when the write fails, so the in-memory copy
    /// always mirrors the store.
    pub fn write(&mut self, param: Param, value: u8) -> Result<(), ConfigError<S::Error>> {
        let result = write_redundant(&mut self.store, param.address(), value);
        self.load();
        result
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
