//! Scripted reader served on a loopback socket

#![allow(dead_code)]

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::timeout;
use uhfprime::{Command, Frame, Reader, ReaderEvent};
use uhfprime_core::FrameDecoder;

pub const WAIT: Duration = Duration::from_secs(2);

pub struct MockDevice {
    listener: TcpListener,
}

impl MockDevice {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self { listener }
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().unwrap().port()
    }

    pub fn reader(&self) -> Reader {
        Reader::new("127.0.0.1", self.port())
    }

    pub async fn accept(&self) -> DeviceLink {
        let (socket, _) = timeout(WAIT, self.listener.accept())
            .await
            .expect("no connection")
            .unwrap();
        DeviceLink {
            socket,
            decoder: FrameDecoder::new(),
            buf: BytesMut::new(),
        }
    }
}

/// Reader-side end of one connection
pub struct DeviceLink {
    socket: TcpStream,
    decoder: FrameDecoder,
    buf: BytesMut,
}

impl DeviceLink {
    /// Next request frame written by the client
    pub async fn next_request(&mut self) -> Frame {
        loop {
            if let Some(raw) = self.decoder.decode(&mut self.buf) {
                return raw.validate().expect("client sent a bad frame");
            }
            let n = timeout(WAIT, self.socket.read_buf(&mut self.buf))
                .await
                .expect("no request")
                .unwrap();
            assert!(n > 0, "client closed the connection");
        }
    }

    /// Bytes the client skipped or corrupted so far
    pub fn discarded(&self) -> u64 {
        self.decoder.discarded()
    }

    pub async fn reply(&mut self, command: Command, status: u8, payload: &[u8]) {
        let frame = reply_frame(command, status, payload);
        self.send_raw(&frame).await;
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.socket.write_all(bytes).await.unwrap();
        self.socket.flush().await.unwrap();
    }

    /// Wait for the client to close its end
    pub async fn expect_closed(&mut self) {
        let mut scratch = [0u8; 64];
        loop {
            let n = timeout(WAIT, self.socket.read(&mut scratch))
                .await
                .expect("connection still open")
                .unwrap_or(0);
            if n == 0 {
                return;
            }
        }
    }
}

/// Encode a reply frame: status byte followed by payload
pub fn reply_frame(command: Command, status: u8, payload: &[u8]) -> BytesMut {
    let mut body = vec![status];
    body.extend_from_slice(payload);
    Frame::encode(0xFF, command, &body).unwrap()
}

/// Body of a request frame as the client wrote it
pub fn request_body(frame: &Frame) -> &[u8] {
    &frame.raw[5..frame.raw.len() - 2]
}

/// 25-byte parameter block with a given address and power
pub fn params_payload(address: u8, power: u8) -> [u8; 25] {
    let mut payload = [0u8; 25];
    payload[0] = address;
    payload[1] = 0x00;
    payload[2] = 0x01;
    payload[6] = 0x01;
    payload[7..15].copy_from_slice(&[0x31, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    payload[15] = power;
    payload[17] = 0x04;
    payload
}

/// Wait for the first event `f` accepts
pub async fn next_event<T>(
    events: &mut broadcast::Receiver<ReaderEvent>,
    mut f: impl FnMut(ReaderEvent) -> Option<T>,
) -> T {
    timeout(WAIT, async {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(found) = f(event) {
                        return found;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
