//! # gamebot
//!
//! A Rust client library for gamebot-serial input-emulation peripherals.
//!
//! The peripheral sits between a UART and a USB gamepad port. This library
//! drives it over the serial line with a small framed request/reply
//! protocol: press buttons, move sticks, press the hat, and query its
//! queue and counter state.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Self-checking frames with resynchronization on line noise
//! - Bounded retry of corrupted or missing replies
//! - Type-safe request builders and reply parsers
//!
//! ## Quick Start
//!
//! ```no_run
//! use gamebot::{Buttons, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gamebot::Error> {
//!     let mut session = Session::serial("/dev/ttyUSB0");
//!     session.open_and_clear().await?;
//!
//!     if session.test_alive().await? {
//!         session.press_buttons(Buttons::A, Some(100)).await?;
//!         let state = session.query_state().await?;
//!         println!("configured: {}", state.configured());
//!     }
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`protocol`] - Frames, opcodes, request builders and reply parsers
//! - [`types`] - Input and peripheral state types
//! - [`transport`] - Transport implementations (currently USB/Serial)
//! - [`transaction`] - Request/reply round trips with retry
//! - [`client`] - High-level [`Session`] client

pub mod client;
pub mod error;
pub mod protocol;
pub mod transaction;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{Session, SessionState};
pub use error::{Error, FrameError, Result};
pub use protocol::{Opcode, ReplyStatus, Request};
pub use transaction::{TransactionConfig, TransactionEngine};
pub use transport::{SerialConfig, SerialTransport, Transport, serial::list_ports};
pub use types::{Buttons, CounterRates, DeviceState, Hat, StickPosition};
