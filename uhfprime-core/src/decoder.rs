//! Streaming frame decoder
//!
//! The reader link can desynchronize after a damaged frame, so the decoder
//! scans forward to the next 0xCF head before reading a header. It does no
//! I/O: the receive loop appends socket reads to a [`BytesMut`] and drains
//! complete frames with [`FrameDecoder::decode`].

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::{
    constants::{CRC_SIZE, FRAME_HEAD, HEADER_SIZE},
    frame::RawFrame,
};

/// Incremental frame splitter
#[derive(Debug, Default)]
pub struct FrameDecoder {
    discarded: u64,
}

impl FrameDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Split the next complete frame off the front of `buf`
    ///
    /// Returns `None` when more bytes are needed. Bytes preceding a sync
    /// byte are dropped. A returned frame is consumed from `buf` even if its
    /// CRC turns out to be wrong; scanning then resumes after it.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Option<RawFrame> {
        match buf.iter().position(|&b| b == FRAME_HEAD) {
            Some(0) => {}
            Some(skip) => {
                trace!(
                    "Skipping {} bytes before frame head: {:02X?}",
                    skip,
                    &buf[..skip.min(16)]
                );
                buf.advance(skip);
                self.discarded += skip as u64;
            }
            None => {
                if !buf.is_empty() {
                    trace!("Discarding {} bytes without frame head", buf.len());
                    self.discarded += buf.len() as u64;
                    buf.clear();
                }
                return None;
            }
        }

        if buf.len() < HEADER_SIZE {
            return None;
        }

        let total = HEADER_SIZE + buf[4] as usize + CRC_SIZE;
        if buf.len() < total {
            buf.reserve(total - buf.len());
            return None;
        }

        Some(RawFrame::new(buf.split_to(total).freeze()))
    }

    /// Number of bytes dropped while hunting for a frame head
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
