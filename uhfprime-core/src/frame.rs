//! UHF Prime frame structure and encoding/decoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    command::Command,
    constants::{
        CRC_SIZE, FRAME_HEAD, HEADER_SIZE, MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE, STATUS_SUCCESS,
    },
    crc,
    error::{Error, Result},
    trace::{Direction, FrameTrace},
};

/// Validated frame received from the reader
///
/// # Frame Structure
///
/// ```text
/// ┌──────┬─────────┬───────────┬────────┬─────────┬───────────┬───────────┐
/// │ 0xCF │ Address │  Command  │   L    │ Status  │  Payload  │   CRC16   │
/// │  1   │    1    │ 2 (BE u16)│   1    │ 1 (L>0) │   L - 1   │ 2 (BE u16)│
/// └──────┴─────────┴───────────┴────────┴─────────┴───────────┴───────────┘
/// ```
///
/// The CRC covers every preceding byte. Outbound frames carry the request
/// payload directly after `L`; replies put a status byte first.
///
/// # Examples
///
/// ```
/// use uhfprime_core::{Command, Frame};
///
/// let encoded = Frame::encode(0xFF, Command::GetAllParameters, &[]).unwrap();
/// assert_eq!(&encoded[..], &[0xCF, 0xFF, 0x00, 0x72, 0x00, 0x17, 0xA5]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Reader address
    pub address: u8,

    /// Command code (kept raw, readers may answer with codes outside the table)
    pub command: u16,

    /// Status byte, 0 when the frame carries no body
    pub status: u8,

    /// Payload without the status byte
    pub payload: Bytes,

    /// Raw frame including head and CRC
    pub raw: Bytes,
}

impl Frame {
    /// Encode an outbound frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the payload does not fit the
    /// one-byte length field.
    pub fn encode(address: u8, command: impl Into<u16>, payload: &[u8]) -> Result<BytesMut> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(MIN_FRAME_SIZE + payload.len());

        buf.put_u8(FRAME_HEAD);
        buf.put_u8(address);
        buf.put_u16(command.into());
        buf.put_u8(payload.len() as u8);
        buf.put_slice(payload);

        let crc = crc::calculate(&buf);
        buf.put_u16(crc);

        Ok(buf)
    }

    /// Decode one complete frame from the start of `buf`
    ///
    /// Trailing bytes after the frame are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The first byte is not the sync byte
    /// - The buffer is shorter than the length field announces
    /// - CRC verification fails
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < MIN_FRAME_SIZE {
            return Err(Error::FrameTooShort {
                expected: MIN_FRAME_SIZE,
                actual: buf.len(),
            });
        }

        if buf[0] != FRAME_HEAD {
            return Err(Error::MissingSync(buf[0]));
        }

        let total = HEADER_SIZE + buf[4] as usize + CRC_SIZE;
        if buf.len() < total {
            return Err(Error::FrameTooShort {
                expected: total,
                actual: buf.len(),
            });
        }

        RawFrame::new(Bytes::copy_from_slice(&buf[..total])).validate()
    }

    /// Typed command, if the code is in the command table
    pub fn command_kind(&self) -> Option<Command> {
        Command::try_from(self.command).ok()
    }

    /// Check if the reader reported success
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("address", &format!("0x{:02X}", self.address))
            .field("command", &format!("0x{:04X}", self.command))
            .field("status", &format!("0x{:02X}", self.status))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CMD=0x{:04X} STATUS=0x{:02X} LEN={}",
            self.command,
            self.status,
            self.payload.len()
        )
    }
}

/// Complete frame carved from the stream, CRC not yet checked
///
/// Header fields are readable whether or not the CRC matches, so damaged
/// frames can still be traced.
#[derive(Clone, PartialEq, Eq)]
pub struct RawFrame {
    raw: Bytes,
}

impl RawFrame {
    /// Wrap exactly one frame's bytes
    ///
    /// Callers must pass `HEADER_SIZE + L + CRC_SIZE` bytes starting at the
    /// sync byte; [`crate::FrameDecoder`] guarantees this.
    pub(crate) fn new(raw: Bytes) -> Self {
        debug_assert!(raw.len() >= MIN_FRAME_SIZE);
        debug_assert_eq!(raw.len(), HEADER_SIZE + raw[4] as usize + CRC_SIZE);
        Self { raw }
    }

    /// Reader address
    pub fn address(&self) -> u8 {
        self.raw[1]
    }

    /// Command code
    pub fn command(&self) -> u16 {
        u16::from_be_bytes([self.raw[2], self.raw[3]])
    }

    /// Length field (status + payload)
    pub fn length(&self) -> usize {
        self.raw[4] as usize
    }

    /// Status byte, 0 when L = 0
    pub fn status(&self) -> u8 {
        if self.length() > 0 {
            self.raw[HEADER_SIZE]
        } else {
            STATUS_SUCCESS
        }
    }

    /// Payload length, status excluded
    pub fn payload_len(&self) -> usize {
        self.length().saturating_sub(1)
    }

    /// CRC carried by the frame
    pub fn received_crc(&self) -> u16 {
        let n = self.raw.len();
        u16::from_be_bytes([self.raw[n - 2], self.raw[n - 1]])
    }

    /// CRC computed over the frame body
    pub fn computed_crc(&self) -> u16 {
        crc::calculate(&self.raw[..self.raw.len() - CRC_SIZE])
    }

    /// Check the CRC
    pub fn is_valid(&self) -> bool {
        self.computed_crc() == self.received_crc()
    }

    /// Describe this frame as received
    pub fn trace(&self) -> FrameTrace {
        FrameTrace {
            raw: self.raw.clone(),
            valid: self.is_valid(),
            address: self.address(),
            command: self.command(),
            status: self.status(),
            payload_len: self.payload_len(),
            direction: Direction::Rx,
        }
    }

    /// Check the CRC and turn this into a [`Frame`]
    pub fn validate(self) -> Result<Frame> {
        let expected = self.computed_crc();
        let received = self.received_crc();
        if expected != received {
            return Err(Error::ChecksumMismatch { expected, received });
        }

        let payload_start = HEADER_SIZE + 1;
        let payload = self
            .raw
            .slice(payload_start..payload_start + self.payload_len());

        Ok(Frame {
            address: self.address(),
            command: self.command(),
            status: self.status(),
            payload,
            raw: self.raw,
        })
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFrame")
            .field("command", &format!("0x{:04X}", self.command()))
            .field("length", &self.length())
            .field("valid", &self.is_valid())
            .finish()
    }
}
