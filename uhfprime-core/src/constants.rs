//! Protocol constants

use std::time::Duration;

/// Frame synchronization byte
pub const FRAME_HEAD: u8 = 0xCF;

/// Head, address, command (2) and length bytes
pub const HEADER_SIZE: usize = 5;

/// Trailing CRC16 bytes
pub const CRC_SIZE: usize = 2;

/// Smallest possible frame: header and CRC with L = 0
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CRC_SIZE;

/// Largest payload the one-byte length field can describe
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

/// Broadcast address accepted by every reader
pub const DEFAULT_ADDRESS: u8 = 0xFF;

/// Reply status meaning success
pub const STATUS_SUCCESS: u8 = 0x00;

/// Default TCP connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default capacity of the event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;
