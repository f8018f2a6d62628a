//! Request/response correlation
//!
//! Replies carry no request identifier, only the command code, so callers
//! waiting on the same command are answered strictly in the order they
//! registered.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;
use uhfprime_core::Frame;

use crate::error::{Error, Result};

struct Waiter {
    id: u64,
    tx: oneshot::Sender<Frame>,
}

/// Per-command FIFO queues of callers waiting for a reply
///
/// The lock is only held while a queue is edited, never across I/O.
#[derive(Default)]
pub(crate) struct WaiterRegistry {
    next_id: AtomicU64,
    queues: Mutex<HashMap<u16, VecDeque<Waiter>>>,
}

impl WaiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a waiter for the next reply to `command`
    ///
    /// Must be called before the request goes on the wire.
    pub fn register(self: &Arc<Self>, command: u16) -> PendingReply {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        self.queues
            .lock()
            .entry(command)
            .or_default()
            .push_back(Waiter { id, tx });

        trace!("Registered waiter {} for 0x{:04X}", id, command);

        PendingReply {
            command,
            id,
            rx,
            registry: Arc::clone(self),
        }
    }

    /// Hand `frame` to the oldest live waiter for its command
    ///
    /// Waiters whose caller already gave up are skipped. Gives the frame
    /// back when nobody is waiting.
    pub fn resolve(&self, mut frame: Frame) -> std::result::Result<(), Frame> {
        loop {
            let waiter = {
                let mut queues = self.queues.lock();
                let Some(queue) = queues.get_mut(&frame.command) else {
                    return Err(frame);
                };
                let waiter = queue.pop_front();
                if queue.is_empty() {
                    queues.remove(&frame.command);
                }
                waiter
            };

            let Some(waiter) = waiter else {
                return Err(frame);
            };

            match waiter.tx.send(frame) {
                Ok(()) => return Ok(()),
                Err(returned) => {
                    trace!("Waiter {} already gone, trying next", waiter.id);
                    frame = returned;
                }
            }
        }
    }

    /// Remove one waiter
    pub fn cancel(&self, command: u16, id: u64) -> bool {
        let mut queues = self.queues.lock();
        let Some(queue) = queues.get_mut(&command) else {
            return false;
        };

        let before = queue.len();
        queue.retain(|waiter| waiter.id != id);
        let removed = queue.len() != before;

        if queue.is_empty() {
            queues.remove(&command);
        }
        removed
    }

    /// Cancel every waiter and clear the registry
    ///
    /// Returns the number of waiters dropped.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<VecDeque<Waiter>> = {
            let mut queues = self.queues.lock();
            queues.drain().map(|(_, queue)| queue).collect()
        };

        // Senders are dropped outside the lock
        drained.iter().map(VecDeque::len).sum()
    }

    /// Number of outstanding waiters
    pub fn pending(&self) -> usize {
        self.queues.lock().values().map(VecDeque::len).sum()
    }
}

/// A registered wait for one reply
///
/// Dropping it before the reply arrives removes the waiter, which is how a
/// caller-side timeout or `select!` cancels a request.
pub(crate) struct PendingReply {
    command: u16,
    id: u64,
    rx: oneshot::Receiver<Frame>,
    registry: Arc<WaiterRegistry>,
}

impl PendingReply {
    /// Wait for the reply
    ///
    /// Fails with [`Error::Cancelled`] if the registry drops the waiter.
    pub async fn wait(mut self) -> Result<Frame> {
        (&mut self.rx).await.map_err(|_| Error::Cancelled)
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if self.registry.cancel(self.command, self.id) {
            trace!(id = self.id, "Waiter cancelled");
        }
    }
}
