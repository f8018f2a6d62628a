//! # uhfprime-core
//!
//! Core protocol implementation for UHF Prime RFID readers.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - CRC16 calculation
//! - Streaming decoder with resynchronization
//! - Command definitions
//! - Protocol constants

pub mod command;
pub mod constants;
pub mod crc;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod session;
pub mod trace;

pub use command::Command;
pub use decoder::FrameDecoder;
pub use error::{Error, Result};
pub use frame::{Frame, RawFrame};
pub use session::{LinkState, Session};
pub use trace::{Direction, FrameTrace};
