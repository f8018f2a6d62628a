//! Link state tracking for a reader session
//!
//! A session tracks:
//! - Link state (disconnected, connecting, connected)
//! - Reader address stamped on every outbound frame

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::constants::DEFAULT_ADDRESS;
use crate::error::{Error, Result};

/// Link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No socket
    Disconnected,

    /// Socket being opened
    Connecting,

    /// Socket open and receive loop running
    Connected,
}

/// Session state holder
///
/// Thread-safe and can be cloned cheaply (Arc internally), so the receive
/// loop can mark the link down when the peer goes away.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Address byte used on outgoing frames
    address: AtomicU8,

    /// Current link state
    state: parking_lot::RwLock<LinkState>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new(address: u8) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                address: AtomicU8::new(address),
                state: parking_lot::RwLock::new(LinkState::Disconnected),
            }),
        }
    }

    /// Get reader address
    pub fn address(&self) -> u8 {
        self.inner.address.load(Ordering::Acquire)
    }

    /// Get current state
    pub fn state(&self) -> LinkState {
        *self.inner.state.read()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        matches!(self.state(), LinkState::Connected)
    }

    /// Start connecting with the given reader address
    pub fn begin_connect(&self, address: u8) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != LinkState::Disconnected {
            return Err(Error::InvalidState(format!(
                "Cannot connect from state: {:?}",
                *state
            )));
        }

        self.inner.address.store(address, Ordering::Release);
        *state = LinkState::Connecting;

        Ok(())
    }

    /// Mark the link as up
    pub fn mark_connected(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != LinkState::Connecting {
            return Err(Error::InvalidState(format!(
                "Cannot finish connecting from state: {:?}",
                *state
            )));
        }

        *state = LinkState::Connected;
        Ok(())
    }

    /// Close session
    ///
    /// Returns the state the session was in.
    pub fn close(&self) -> LinkState {
        std::mem::replace(&mut *self.inner.state.write(), LinkState::Disconnected)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}
