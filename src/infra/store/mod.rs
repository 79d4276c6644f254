//! Byte-addressable non-volatile store (data EEPROM on the target) and the
//! value + complement redundancy scheme layered on top of it.
use crate::error::ConfigError;

/// Synchronous access to the persistent configuration bytes.
///
/// `write` must not return before the cell is committed: the settings are
/// re-read right after every write.
pub trait ConfigStore {
    type Error: core::fmt::Debug;
    /// Read the byte stored at `address`.
    fn read(&mut self, address: u8) -> Result<u8, Self::Error>;
    /// Persist `value` at `address`, blocking until the write completes.
    fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;
}

/// Read the value stored at `address` and its complement at `address + 1`.
///
/// Returns `Ok(None)` when the pair is inconsistent (erased or corrupted cell).
pub fn read_redundant<S: ConfigStore>(
    store: &mut S,
    address: u8,
) -> Result<Option<u8>, ConfigError<S::Error>> {
    let value = store
        .read(address)
        .map_err(|error| ConfigError::Read { address, error })?;
    let complement_address = address.wrapping_add(1);
    let complement = store
        .read(complement_address)
        .map_err(|error| ConfigError::Read {
            address: complement_address,
            error,
        })?;

    if !value == complement {
        Ok(Some(value))
    } else {
        Ok(None)
    }
}

/// Store `value` at `address` followed by its complement at `address + 1`.
pub fn write_redundant<S: ConfigStore>(
    store: &mut S,
    address: u8,
    value: u8,
) -> Result<(), ConfigError<S::Error>> {
    store
        .write(address, value)
        .map_err(|error| ConfigError::Write { address, error })?;
    let complement_address = address.wrapping_add(1);
    store
        .write(complement_address, !value)
        .map_err(|error| ConfigError::Write {
            address: complement_address,
            error,
        })
}

//==================================================================================RAM_STORE
/// Access outside the bounds of a [`RamStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressOutOfRange(pub u8);

/// Volatile store for host builds and simulations. Starts erased (`0xFF`),
/// like a fresh EEPROM.
#[derive(Debug, Clone, Copy)]
pub struct RamStore<const N: usize> {
    cells: [u8; N],
}

impl<const N: usize> Default for RamStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamStore<N> {
    pub const fn new() -> Self {
        Self { cells: [0xFF; N] }
    }

    /// Raw view of the cells, used to inspect or corrupt the image in tests.
    pub fn cells(&self) -> &[u8; N] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [u8; N] {
        &mut self.cells
    }
}

impl<const N: usize> ConfigStore for RamStore<N> {
    type Error = AddressOutOfRange;

    fn read(&mut self, address: u8) -> Result<u8, Self::Error> {
        self.cells
            .get(address as usize)
            .copied()
            .ok_or(AddressOutOfRange(address))
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        let cell = self
            .cells
            .get_mut(address as usize)
            .ok_or(AddressOutOfRange(address))?;
        *cell = value;
        Ok(())
    }
}
