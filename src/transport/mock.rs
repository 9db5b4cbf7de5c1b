//! Scripted in-memory transport for tests.
//!
//! Each write pops the next scripted response and queues its bytes for
//! reading. Reads hand bytes out in small chunks so the decoder sees
//! partial frames. Late responses only reach the input buffer once their
//! delay has elapsed on the tokio clock.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::protocol::encode_frame;
use crate::transport::{Transport, TransportFuture};

/// Bytes handed out per read.
const CHUNK: usize = 3;

/// What the fake peripheral does after receiving one request.
#[derive(Debug, Clone)]
pub(crate) enum Response {
    /// Sends these raw bytes.
    Raw(Vec<u8>),
    /// Sends these raw bytes after a delay.
    Late(Duration, Vec<u8>),
    /// Says nothing; reads wait forever.
    Silence,
    /// Drops the line; reads return 0.
    Hangup,
}

impl Response {
    /// A well-formed reply frame carrying `payload`.
    pub(crate) fn frame(payload: &[u8]) -> Self {
        Self::Raw(encode_frame(payload).to_vec())
    }

    /// A reply frame whose checksum byte is wrong.
    pub(crate) fn corrupted(payload: &[u8]) -> Self {
        let mut bytes = encode_frame(payload).to_vec();
        let at = bytes.len() - 2;
        bytes[at] ^= 0xFF;
        Self::Raw(bytes)
    }

    /// A well-formed reply frame that arrives `delay` after the request.
    pub(crate) fn late(delay: Duration, payload: &[u8]) -> Self {
        Self::Late(delay, encode_frame(payload).to_vec())
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    script: VecDeque<Response>,
    pending: VecDeque<u8>,
    in_flight: VecDeque<(Instant, Vec<u8>)>,
    hung_up: bool,
    connected: bool,
    fail_writes: bool,
    pub(crate) writes: Vec<Bytes>,
    pub(crate) input_resets: usize,
    pub(crate) output_resets: usize,
}

impl MockTransport {
    pub(crate) fn new(script: impl IntoIterator<Item = Response>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Every write fails as if the adapter was unplugged.
    pub(crate) fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Moves late bytes whose delay has elapsed into the input buffer.
    fn arrive(&mut self) {
        let now = Instant::now();
        while self.in_flight.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, bytes)) = self.in_flight.pop_front() {
                self.pending.extend(bytes);
            }
        }
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connected = true;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connected = false;
            Ok(())
        })
    }

    fn write(&mut self, data: Bytes) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.connected {
                return Err(Error::NotConnected);
            }
            if self.fail_writes {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "device unplugged",
                )));
            }
            self.writes.push(data);
            match self.script.pop_front() {
                Some(Response::Raw(bytes)) => self.pending.extend(bytes),
                Some(Response::Late(delay, bytes)) => {
                    // The peripheral answers in order, so a reply never
                    // overtakes one still in flight
                    let earliest = self.in_flight.back().map_or(Instant::now(), |(at, _)| *at);
                    let at = earliest.max(Instant::now() + delay);
                    self.in_flight.push_back((at, bytes));
                }
                Some(Response::Hangup) => self.hung_up = true,
                Some(Response::Silence) | None => {}
            }
            Ok(())
        })
    }

    fn read<'a>(&'a mut self, buf: &'a mut [u8]) -> TransportFuture<'a, usize> {
        Box::pin(async move {
            if !self.connected {
                return Err(Error::NotConnected);
            }
            self.arrive();
            while self.pending.is_empty() {
                match self.in_flight.front() {
                    Some(&(at, _)) => tokio::time::sleep_until(at).await,
                    None if self.hung_up => return Ok(0),
                    None => std::future::pending::<()>().await,
                }
                self.arrive();
            }
            let n = self.pending.len().min(buf.len()).min(CHUNK);
            for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        })
    }

    fn bytes_available(&self) -> Result<usize> {
        let now = Instant::now();
        let arrived: usize = self
            .in_flight
            .iter()
            .take_while(|(at, _)| *at <= now)
            .map(|(_, bytes)| bytes.len())
            .sum();
        Ok(self.pending.len() + arrived)
    }

    fn reset_input_buffer(&mut self) -> Result<()> {
        self.input_resets += 1;
        self.arrive();
        self.pending.clear();
        Ok(())
    }

    fn reset_output_buffer(&mut self) -> Result<()> {
        self.output_resets += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
