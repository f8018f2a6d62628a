//! Reader parameter record
//!
//! The 25-byte block exchanged by `RFM_GET_ALL_PARAM` / `RFM_SET_ALL_PARAM`.

use std::fmt;

use bitflags::bitflags;

use crate::error::{Error, Result};

bitflags! {
    /// Enabled antenna ports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AntennaSet: u8 {
        const ANT1 = 1 << 0;
        const ANT2 = 1 << 1;
        const ANT3 = 1 << 2;
        const ANT4 = 1 << 3;
        const ANT5 = 1 << 4;
        const ANT6 = 1 << 5;
        const ANT7 = 1 << 6;
        const ANT8 = 1 << 7;
    }
}

/// Complete reader configuration
///
/// # Layout
///
/// ```text
/// 0  address          9..14 frequency (cont.)  19 access address
/// 1  protocol         15    power              20 access data length
/// 2  work mode        16    inquiry area       21 filter time (s)
/// 3  interface        17    Q value            22 trigger time (s)
/// 4  baud rate        18    session            23 buzzer ticks
/// 5  wiegand                                   24 polling interval
/// 6  antenna mask
/// 7  frequency table (8 bytes, 7..=14)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReaderParameters {
    pub address: u8,
    pub protocol: u8,
    pub work_mode: u8,
    pub interface: u8,
    pub baud_rate: u8,
    pub wiegand: u8,
    /// Raw antenna mask, see [`ReaderParameters::antennas`]
    pub antenna_mask: u8,
    pub frequency: [u8; 8],
    pub power: u8,
    pub inquiry_area: u8,
    /// Anti-collision slot count exponent
    pub q_value: u8,
    pub session: u8,
    pub access_address: u8,
    pub access_data_length: u8,
    pub filter_time_secs: u8,
    pub trigger_time_secs: u8,
    pub buzzer_ticks: u8,
    pub polling_interval: u8,
}

impl ReaderParameters {
    /// Encoded size in bytes
    pub const PAYLOAD_LEN: usize = 25;

    /// Parse the parameter block from a reply payload
    ///
    /// Bytes past the 25th are ignored.
    ///
    /// # Errors
    ///
    /// Returns a validation error if fewer than 25 bytes are given.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::PAYLOAD_LEN {
            return Err(Error::Validation(format!(
                "Expected {} parameter bytes but received {}",
                Self::PAYLOAD_LEN,
                payload.len()
            )));
        }

        let mut frequency = [0u8; 8];
        frequency.copy_from_slice(&payload[7..15]);

        Ok(Self {
            address: payload[0],
            protocol: payload[1],
            work_mode: payload[2],
            interface: payload[3],
            baud_rate: payload[4],
            wiegand: payload[5],
            antenna_mask: payload[6],
            frequency,
            power: payload[15],
            inquiry_area: payload[16],
            q_value: payload[17],
            session: payload[18],
            access_address: payload[19],
            access_data_length: payload[20],
            filter_time_secs: payload[21],
            trigger_time_secs: payload[22],
            buzzer_ticks: payload[23],
            polling_interval: payload[24],
        })
    }

    /// Encode the parameter block
    pub fn to_payload(&self) -> [u8; Self::PAYLOAD_LEN] {
        let mut payload = [0u8; Self::PAYLOAD_LEN];
        payload[0] = self.address;
        payload[1] = self.protocol;
        payload[2] = self.work_mode;
        payload[3] = self.interface;
        payload[4] = self.baud_rate;
        payload[5] = self.wiegand;
        payload[6] = self.antenna_mask;
        payload[7..15].copy_from_slice(&self.frequency);
        payload[15] = self.power;
        payload[16] = self.inquiry_area;
        payload[17] = self.q_value;
        payload[18] = self.session;
        payload[19] = self.access_address;
        payload[20] = self.access_data_length;
        payload[21] = self.filter_time_secs;
        payload[22] = self.trigger_time_secs;
        payload[23] = self.buzzer_ticks;
        payload[24] = self.polling_interval;
        payload
    }

    /// Enabled antennas
    ///
    /// Unknown bits are retained.
    pub fn antennas(&self) -> AntennaSet {
        AntennaSet::from_bits_retain(self.antenna_mask)
    }

    /// Replace the enabled antennas
    pub fn set_antennas(&mut self, antennas: AntennaSet) {
        self.antenna_mask = antennas.bits();
    }
}

impl fmt::Display for ReaderParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Params[addr=0x{:02X}, power={}, Q={}, session={}, antennas=0x{:02X}]",
            self.address, self.power, self.q_value, self.session, self.antenna_mask
        )
    }
}
