//! Adapter command telegrams.
//!
//! Two fixed headers address the adapter itself rather than the vehicle:
//!
//! | Telegram (without checksum) | Meaning                                   |
//! |-----------------------------|-------------------------------------------|
//! | `81 00 00 mm`               | store CAN mode `mm`, reply `!mode`        |
//! | `82 F1 F1 0s vv`            | write parameter `s` = `vv`, reply value   |
//! | `82 F1 F1 8s xx`            | read parameter `s`, reply value           |
//! | `82 F1 F1 FD FD`            | adapter type, reply `0x02`                |
//! | `82 F1 F1 FE FE`            | ignition state (`ignition-state` feature) |
//! | `82 F1 F1 FF FF`            | reset, no reply                           |
//!
//! with `s` = 0 block size, 1 separation time, 2 CAN mode. Replies reuse the
//! request bytes, overwrite one value byte, and recompute the checksum.
use crate::infra::checksum::seal;
use crate::infra::store::ConfigStore;
use crate::protocol::device::can_bridge::{CanBridge, PassThrough};
use crate::protocol::device::config::{Param, Settings, CAN_MODE_OFF};
use crate::protocol::transport::traits::board::Board;
use crate::protocol::transport::traits::can_controller::CanController;

//==================================================================================Constants
/// Header of the short CAN mode command.
pub const CAN_MODE_HEADER: [u8; 3] = [0x81, 0x00, 0x00];
pub const CAN_MODE_TELEGRAM_LEN: usize = 5;

/// Header of the adapter parameter commands.
pub const ADAPTER_HEADER: [u8; 3] = [0x82, 0xF1, 0xF1];
pub const ADAPTER_TELEGRAM_LEN: usize = 6;

/// Set in the selector byte for a read, clear for a write.
pub const READ_FLAG: u8 = 0x80;

/// Value answered to the identification request.
pub const ADAPTER_TYPE: u8 = 0x02;

const SELECTOR: usize = 3;
const VALUE: usize = 4;

//==================================================================================Command
/// Decoded adapter command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `81 00 00 mm`: store a new CAN mode.
    StoreCanMode(u8),
    /// Read a parameter (`write == None`) or write it first.
    Parameter { param: Param, write: Option<u8> },
    Identify,
    IgnitionState,
    Reset,
    /// Adapter header with a payload this firmware does not know. Swallowed.
    Unsupported,
}

impl Command {
    /// Decode `telegram` (checksum included). `None` when it is not addressed
    /// to the adapter.
    pub fn decode(telegram: &[u8]) -> Option<Command> {
        if telegram.len() == CAN_MODE_TELEGRAM_LEN && telegram[..3] == CAN_MODE_HEADER {
            return Some(Command::StoreCanMode(telegram[SELECTOR]));
        }
        if telegram.len() != ADAPTER_TELEGRAM_LEN || telegram[..3] != ADAPTER_HEADER {
            return None;
        }

        let selector = telegram[SELECTOR];
        let value = telegram[VALUE];
        let write = if selector & READ_FLAG == 0 {
            Some(value)
        } else {
            None
        };

        let command = match selector & !READ_FLAG {
            0x00 => Command::Parameter {
                param: Param::BlockSize,
                write,
            },
            0x01 => Command::Parameter {
                param: Param::SeparationTime,
                write,
            },
            0x02 => Command::Parameter {
                param: Param::CanMode,
                write,
            },
            _ => match (selector, value) {
                (0xFD, 0xFD) => Command::Identify,
                (0xFE, 0xFE) if cfg!(feature = "ignition-state") => Command::IgnitionState,
                (0xFF, 0xFF) => Command::Reset,
                _ => Command::Unsupported,
            },
        };
        Some(command)
    }
}

//==================================================================================Outcome
/// What the caller has to do after [`execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The telegram buffer now holds the reply; send it unchanged in length.
    Reply,
    /// Handled, nothing to send.
    Silent,
    /// Restart the device. No reply.
    Reset,
    /// Not an adapter command: forward it.
    NotHandled,
}

/// Interpret `telegram` as an adapter command, editing it in place into the
/// reply.
///
/// Store and CAN failures do not abort the command: the reply then carries
/// the value actually in effect, which is how the peer notices.
pub fn execute<S, C, H, B>(
    telegram: &mut [u8],
    settings: &mut Settings<S>,
    can: &mut CanBridge<C, H>,
    board: &mut B,
) -> Outcome
where
    S: ConfigStore,
    C: CanController,
    H: PassThrough,
    B: Board,
{
    let Some(command) = Command::decode(telegram) else {
        return Outcome::NotHandled;
    };

    #[cfg(feature = "defmt")]
    defmt::debug!("Adapter command {=[u8]:#x}", &telegram[..]);

    match command {
        Command::StoreCanMode(mode) => {
            store(settings, Param::CanMode, mode);
            apply_can_mode(settings, can);
            telegram[SELECTOR] = !settings.config().can_mode;
        }
        Command::Parameter { param, write } => {
            if let Some(value) = write {
                store(settings, param, value);
                if param == Param::CanMode {
                    apply_can_mode(settings, can);
                }
            }
            telegram[VALUE] = settings.config().get(param);
        }
        Command::Identify => {
            telegram[VALUE] = ADAPTER_TYPE;
        }
        Command::IgnitionState => {
            let mut state = if board.ignition_state() { 0x01 } else { 0x00 };
            if settings.config().can_mode != CAN_MODE_OFF {
                state |= 0x80;
            }
            telegram[VALUE] = state;
        }
        Command::Reset => {
            #[cfg(feature = "defmt")]
            defmt::info!("Reset requested");
            return Outcome::Reset;
        }
        Command::Unsupported => return Outcome::Silent,
    }

    seal(telegram);
    Outcome::Reply
}

fn store<S: ConfigStore>(settings: &mut Settings<S>, param: Param, value: u8) {
    if let Err(_err) = settings.write(param, value) {
        #[cfg(feature = "defmt")]
        defmt::warn!("Storing param {=u8:#x} failed", param.address());
    }
}

fn apply_can_mode<S, C, H>(settings: &Settings<S>, can: &mut CanBridge<C, H>)
where
    S: ConfigStore,
    C: CanController,
    H: PassThrough,
{
    if let Err(_err) = can.configure(settings.config().can_mode) {
        #[cfg(feature = "defmt")]
        defmt::warn!("CAN reconfiguration failed");
    }
}
