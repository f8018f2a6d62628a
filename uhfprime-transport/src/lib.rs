//! Transport layer for the UHF Prime protocol
//!
//! Opens byte-stream connections to readers. The session engine reads and
//! writes the two halves of a [`Connection`] from different tasks.

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpTransport;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Read half of an open connection
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Write half of an open connection
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// An open byte stream, split into independently owned halves
pub struct Connection {
    pub reader: BoxedReader,
    pub writer: BoxedWriter,
    /// Peer description for logs
    pub peer: String,
}

impl Connection {
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            peer: peer.into(),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("peer", &self.peer).finish()
    }
}

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new connection to the reader
    async fn open(&self) -> Result<Connection>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
