//! Transport layer for gamebot communication.
//!
//! This module provides the abstraction over the byte stream the frames
//! travel on. Only USB/Serial is implemented; tests use a scripted
//! in-memory transport.

#[cfg(test)]
pub(crate) mod mock;
pub mod serial;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::Result;

/// Boxed future returned by transport operations.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Trait for transport implementations.
///
/// A transport is owned by exactly one session and is never shared, so
/// every operation takes `&mut self`.
pub trait Transport: Send {
    /// Opens the line.
    fn connect(&mut self) -> TransportFuture<'_, ()>;

    /// Closes the line.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Writes all of `data` and flushes.
    fn write(&mut self, data: Bytes) -> TransportFuture<'_, ()>;

    /// Reads whatever is available into `buf`, waiting for at least one byte.
    ///
    /// Returns `0` if the line was closed by the other end.
    fn read<'a>(&'a mut self, buf: &'a mut [u8]) -> TransportFuture<'a, usize>;

    /// Returns the number of bytes waiting in the input buffer.
    fn bytes_available(&self) -> Result<usize>;

    /// Discards unread input.
    fn reset_input_buffer(&mut self) -> Result<()>;

    /// Discards unsent output.
    fn reset_output_buffer(&mut self) -> Result<()>;

    /// Returns true if connected.
    fn is_connected(&self) -> bool;
}

pub use serial::{SerialConfig, SerialTransport};
