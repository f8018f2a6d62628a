//! Error types for uhfprime-core



/// Result type alias for uhfprime-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Outbound payload does not fit the one-byte length field
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Frame is too short to be valid
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// Frame does not start with the 0xCF sync byte
    #[error("Missing sync byte: got 0x{0:02X}")]
    MissingSync(u8),

    /// CRC16 verification failed
    #[error("CRC mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        expected: u16,
        received: u16,
    },

    /// Unknown command code
    #[error("Unknown command code: 0x{0:04X}")]
    UnknownCommand(u16),

    /// Invalid link state transition
    #[error("Invalid link state: {0}")]
    InvalidState(String),
}

impl Error {
    /// Check if error comes from a damaged or desynchronized frame
    ///
    /// Framing errors are dropped by the receive loop and never reach callers.
    pub fn is_framing_error(&self) -> bool {
        matches!(
            self,
            Self::FrameTooShort { .. }
                | Self::MissingSync(_)
                | Self::ChecksumMismatch { .. }
        )
    }
}
