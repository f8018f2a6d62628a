//! UHF Prime command definitions

use std::fmt;

use crate::error::{Error, Result};

/// Protocol command codes
///
/// Command identifiers from the UHF Prime reader manual. Only the parameter,
/// inventory and relay commands have typed payloads in this crate; the rest
/// can still be sent as raw frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    // Inventory
    InventoryIsoContinue = 0x0001,
    InventoryStop = 0x0002,

    // Module management
    ModuleInit = 0x0050,
    Reboot = 0x0052,
    SetPower = 0x0053,
    SetProtocol = 0x0059,

    // Device configuration
    SetGetNetworkParameters = 0x0064,
    GetDeviceInfo = 0x0070,
    SetAllParameters = 0x0071,
    GetAllParameters = 0x0072,

    // Peripherals
    RelayControl = 0x0077,
}

impl Command {
    /// Every known command
    pub const ALL: [Command; 11] = [
        Self::InventoryIsoContinue,
        Self::InventoryStop,
        Self::ModuleInit,
        Self::Reboot,
        Self::SetPower,
        Self::SetProtocol,
        Self::SetGetNetworkParameters,
        Self::GetDeviceInfo,
        Self::SetAllParameters,
        Self::GetAllParameters,
        Self::RelayControl,
    ];

    /// Check if the reader answers this command with an unsolicited stream
    pub fn is_streaming(self) -> bool {
        matches!(self, Self::InventoryIsoContinue)
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::InventoryIsoContinue => "RFM_INVENTORYISO_CONTINUE",
            Self::InventoryStop => "RFM_INVENTORY_STOP",
            Self::ModuleInit => "RFM_MODULE_INT",
            Self::Reboot => "RFM_REBOOT",
            Self::SetPower => "RFM_SET_PWR",
            Self::SetProtocol => "RFM_SET_PROTOCOL",
            Self::SetGetNetworkParameters => "RFM_SET_GET_NETPARA",
            Self::GetDeviceInfo => "RFM_GET_DEVICE_INFO",
            Self::SetAllParameters => "RFM_SET_ALL_PARAM",
            Self::GetAllParameters => "RFM_GET_ALL_PARAM",
            Self::RelayControl => "RFM_RELAY_CONTROL",
        }
    }
}

impl From<Command> for u16 {
    fn from(cmd: Command) -> u16 {
        cmd as u16
    }
}

impl TryFrom<u16> for Command {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x0001 => Ok(Self::InventoryIsoContinue),
            0x0002 => Ok(Self::InventoryStop),
            0x0050 => Ok(Self::ModuleInit),
            0x0052 => Ok(Self::Reboot),
            0x0053 => Ok(Self::SetPower),
            0x0059 => Ok(Self::SetProtocol),
            0x0064 => Ok(Self::SetGetNetworkParameters),
            0x0070 => Ok(Self::GetDeviceInfo),
            0x0071 => Ok(Self::SetAllParameters),
            0x0072 => Ok(Self::GetAllParameters),
            0x0077 => Ok(Self::RelayControl),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:04X})", self.name(), *self as u16)
    }
}
