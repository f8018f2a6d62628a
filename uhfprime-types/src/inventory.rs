//! Inventory and relay request payloads

use byteorder::{BigEndian, ByteOrder};

/// Inventory request mode and its parameter (time or cycle count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryRequest {
    pub mode: u8,
    pub parameter: u32,
}

impl InventoryRequest {
    /// Run until stopped
    pub const MODE_CONTINUOUS: u8 = 0x00;

    pub fn new(mode: u8, parameter: u32) -> Self {
        Self { mode, parameter }
    }

    /// Continuous inventory
    pub fn continuous() -> Self {
        Self::new(Self::MODE_CONTINUOUS, 0)
    }

    /// Encode as `[mode, parameter (BE u32)]`
    pub fn to_payload(&self) -> [u8; 5] {
        let mut payload = [0u8; 5];
        payload[0] = self.mode;
        BigEndian::write_u32(&mut payload[1..], self.parameter);
        payload
    }
}

impl Default for InventoryRequest {
    fn default() -> Self {
        Self::continuous()
    }
}

/// Relay contact action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayAction {
    Close,
    Open,
}

impl RelayAction {
    /// Relay subtype byte
    pub const SUBTYPE: u8 = 0x02;

    /// Flag byte sent to the reader
    pub fn flag(self) -> u8 {
        match self {
            Self::Close => 0x00,
            Self::Open => 0x01,
        }
    }

    /// Encode as `[subtype, flag]`
    pub fn to_payload(self) -> [u8; 2] {
        [Self::SUBTYPE, self.flag()]
    }
}
