//! # uhfprime
//!
//! Rust client for UHF Prime RFID reader appliances reachable over TCP.
//!
//! ## Features
//!
//! - Frame encoding/decoding with CRC16 validation and resynchronization
//! - Async/await API using Tokio, safe to share between tasks
//! - Per-command request/response correlation (FIFO per command)
//! - Inventory stream turned into [`TagReport`] events
//! - Frame tracing for diagnostics
//!
//! ## Quick Start
//!
//! ```no_run
//! use uhfprime::Reader;
//!
//! #[tokio::main]
//! async fn main() -> uhfprime::Result<()> {
//!     // Connect to reader
//!     let reader = Reader::new("192.168.1.190", 2022);
//!     reader.connect().await?;
//!
//!     // Read configuration
//!     let params = reader.get_all_parameters().await?;
//!     println!("{}", params);
//!
//!     // Disconnect
//!     reader.disconnect().await;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod event;
pub mod reader;
mod waiter;

// Re-exports
pub use error::{Error, Result};
pub use event::ReaderEvent;
pub use reader::Reader;

// Re-export types
pub use uhfprime_core::{Command, Frame, FrameTrace, LinkState};
pub use uhfprime_transport::{Connection, TcpTransport, Transport};
pub use uhfprime_types::{AntennaSet, InventoryRequest, ReaderParameters, RelayAction, TagReport};
