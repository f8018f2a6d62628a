//! Type definitions for uhfprime

pub mod error;
pub mod inventory;
pub mod parameters;
pub mod tag;

pub use error::{Error, Result};
pub use inventory::{InventoryRequest, RelayAction};
pub use parameters::{AntennaSet, ReaderParameters};
pub use tag::TagReport;
