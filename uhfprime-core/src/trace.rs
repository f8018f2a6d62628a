//! Frame trace records
//!
//! Every frame that crosses the wire, inbound or outbound, valid or not, is
//! described by a [`FrameTrace`]. This is the diagnostic surface hosts use to
//! build frame logs.

use std::fmt;

use bytes::Bytes;

/// Direction of a traced frame
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to reader
    Tx,

    /// Reader to host
    Rx,
}

/// Diagnostic record of one transmitted or received frame
#[derive(Clone, PartialEq, Eq)]
pub struct FrameTrace {
    /// Full wire bytes including head and CRC
    pub raw: Bytes,

    /// Whether the CRC checked out (always true for TX)
    pub valid: bool,

    /// Reader address
    pub address: u8,

    /// Command code
    pub command: u16,

    /// Status byte (0 for TX)
    pub status: u8,

    /// Payload length, status excluded for RX
    pub payload_len: usize,

    /// Direction on the wire
    pub direction: Direction,
}

impl FrameTrace {
    /// Trace record for an outbound frame
    pub fn outbound(raw: Bytes, address: u8, command: u16, payload_len: usize) -> Self {
        Self {
            raw,
            valid: true,
            address,
            command,
            status: 0x00,
            payload_len,
            direction: Direction::Tx,
        }
    }

    /// Short note describing the frame
    pub fn note(&self) -> &'static str {
        match (self.direction, self.valid) {
            (Direction::Tx, _) => "TX",
            (Direction::Rx, true) => "RX",
            (Direction::Rx, false) => "RX CRC mismatch",
        }
    }

    /// Raw bytes as uppercase hex
    pub fn hex(&self) -> String {
        hex::encode_upper(&self.raw)
    }
}

impl fmt::Debug for FrameTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameTrace")
            .field("note", &self.note())
            .field("address", &format!("0x{:02X}", self.address))
            .field("command", &format!("0x{:04X}", self.command))
            .field("status", &format!("0x{:02X}", self.status))
            .field("payload_len", &self.payload_len)
            .field("raw", &self.hex())
            .finish()
    }
}

impl fmt::Display for FrameTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} CMD=0x{:04X} STATUS=0x{:02X} LEN={} Valid={} HEX={}",
            self.note(),
            self.command,
            self.status,
            self.payload_len,
            self.valid,
            self.hex()
        )
    }
}
