//! High-level error types

use uhfprime_core::Command;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] uhfprime_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] uhfprime_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] uhfprime_types::Error),

    #[error("Reader not connected")]
    NotConnected,

    /// The wait was cancelled by disconnect or loss of the link
    #[error("Request cancelled")]
    Cancelled,

    /// Reader answered with a non-zero status
    #[error("Reader returned error status 0x{status:02X} to {command}")]
    Status {
        command: Command,
        status: u8,
    },
}

impl Error {
    /// Check if the request was cancelled rather than rejected
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the reader rejected the command
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Check if error requires reconnection
    pub fn requires_reconnect(&self) -> bool {
        matches!(self, Self::NotConnected | Self::Transport(_))
    }
}
