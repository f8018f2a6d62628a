//! Tag reports extracted from inventory replies

use std::fmt;
use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// RSSI (2), antenna, channel, length/PC byte
const MIN_PAYLOAD_LEN: usize = 5;

/// One tag observation
#[derive(Debug, Clone, PartialEq)]
pub struct TagReport {
    /// EPC as uppercase hex
    pub epc: String,

    /// Same as the EPC; no separate TID read is performed
    pub uid: String,

    /// Signal strength in dBm
    pub rssi: f64,

    pub antenna: u8,

    pub channel: u8,

    /// Capture time
    pub timestamp: DateTime<Utc>,

    /// Inventory payload the report was parsed from
    pub raw_payload: Vec<u8>,
}

impl TagReport {
    /// Parse an inventory reply payload (status byte excluded)
    ///
    /// ```text
    /// 0..2  RSSI, signed BE, tenths of dBm
    /// 2     antenna
    /// 3     channel
    /// 4     EPC length, or first byte of the PC word when zero / too long
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use uhfprime_types::TagReport;
    ///
    /// let payload = [0xFF, 0xCE, 0x01, 0x03, 0x04, 0xAA, 0xBB, 0xCC, 0xDD];
    /// let report = TagReport::parse_inventory_payload(&payload).unwrap();
    ///
    /// assert_eq!(report.epc, "AABBCCDD");
    /// assert_eq!(report.rssi, -5.0);
    /// ```
    pub fn parse_inventory_payload(payload: &[u8]) -> Result<Self> {
        Self::parse_inventory_payload_at(payload, Utc::now())
    }

    /// Parse with an explicit capture time
    pub fn parse_inventory_payload_at(payload: &[u8], timestamp: DateTime<Utc>) -> Result<Self> {
        if payload.len() < MIN_PAYLOAD_LEN {
            return Err(Error::Parse(format!(
                "Inventory payload too short: {} bytes",
                payload.len()
            )));
        }

        let span = explicit_epc_span(payload)
            .or_else(|| pc_word_epc_span(payload))
            .ok_or_else(|| {
                Error::Parse(format!(
                    "No EPC length fits inventory payload of {} bytes",
                    payload.len()
                ))
            })?;

        let epc = hex::encode_upper(&payload[span]);
        let rssi = BigEndian::read_i16(&payload[..2]) as f64 / 10.0;

        Ok(Self {
            uid: epc.clone(),
            epc,
            rssi,
            antenna: payload[2],
            channel: payload[3],
            timestamp,
            raw_payload: payload.to_vec(),
        })
    }
}

impl fmt::Display for TagReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tag[EPC: {}, RSSI: {:.1} dBm, ANT: {}, CH: {}]",
            self.epc, self.rssi, self.antenna, self.channel
        )
    }
}

/// EPC location when byte 4 holds the EPC length
///
/// Applies when byte 4 is non-zero and the payload holds that many bytes
/// starting at offset 5.
pub fn explicit_epc_span(payload: &[u8]) -> Option<Range<usize>> {
    let len = *payload.get(4)? as usize;
    if len == 0 || payload.len() < 5 + len {
        return None;
    }
    Some(5..5 + len)
}

/// EPC location derived from the PC word at bytes 4..6
///
/// The top five bits of the PC word count EPC words.
pub fn pc_word_epc_span(payload: &[u8]) -> Option<Range<usize>> {
    let pc = BigEndian::read_u16(payload.get(4..6)?);
    let len = (pc >> 11) as usize * 2;
    if len == 0 || payload.len() < 6 + len {
        return None;
    }
    Some(6..6 + len)
}
