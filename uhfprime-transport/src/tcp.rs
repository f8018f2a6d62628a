//! TCP transport

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use uhfprime_core::constants::DEFAULT_CONNECT_TIMEOUT;

use crate::{error::*, Connection, Transport};

/// TCP transport for UHF Prime readers
#[derive(Debug, Clone)]
pub struct TcpTransport {
    addr: String,
    port: u16,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Configured host
    pub fn host(&self) -> &str {
        &self.addr
    }

    /// Configured port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.addr, self.port);

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .collect();

        addrs
            .first()
            .copied()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn open(&self) -> Result<Connection> {
        let addr = self.resolve_addr().await?;

        debug!("Connecting to {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Io)?;

        // Disable Nagle's algorithm, frames are small and latency matters
        stream.set_nodelay(true)?;

        debug!("Connected to {}", addr);

        let (reader, writer) = stream.into_split();
        Ok(Connection::new(reader, writer, addr.to_string()))
    }

    fn remote_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_transport_create() {
        let transport = TcpTransport::new("192.168.1.190", 2022);
        assert_eq!(transport.remote_addr(), "192.168.1.190:2022");
        assert_eq!(transport.host(), "192.168.1.190");
        assert_eq!(transport.port(), 2022);
    }

    #[tokio::test]
    async fn test_tcp_transport_invalid_address() {
        let transport = TcpTransport::new("invalid..address", 2022)
            .with_connect_timeout(Duration::from_millis(100));

        let result = transport.open().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_tcp_transport_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = TcpTransport::new("127.0.0.1", port);
        assert!(matches!(transport.open().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_tcp_transport_halves_carry_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let echo = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(&buf).await.unwrap();
        });

        let transport = TcpTransport::new("127.0.0.1", port);
        let mut conn = transport.open().await.unwrap();
        assert_eq!(conn.peer, format!("127.0.0.1:{}", port));

        conn.writer.write_all(&[0xCF, 0xFF, 0x00, 0x72]).await.unwrap();
        let mut buf = [0u8; 4];
        conn.reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [0xCF, 0xFF, 0x00, 0x72]);

        echo.await.unwrap();
    }
}
