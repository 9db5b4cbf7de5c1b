//! Request/reply transactions with bounded retry.
//!
//! One attempt writes a request frame and reads until a reply frame is
//! decoded. Framing, checksum, timeout and empty-reply failures spoil only
//! the attempt and are retried; transport failures end the transaction.

use std::io;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::protocol::{FrameDecoder, LINE_TRAILER, Request, encode_frame};
use crate::transport::Transport;

/// Default number of attempts per transaction.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default bound on a single read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Default bound on a whole attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(3);

/// Read buffer size; larger than any frame.
const READ_CHUNK: usize = 64;

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Retry and timeout settings for transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionConfig {
    /// Attempts per transaction, first one included.
    pub max_attempts: u32,
    /// Longest wait for any single read.
    pub read_timeout: Duration,
    /// Longest wait for one complete reply frame.
    pub attempt_timeout: Duration,
}

impl TransactionConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            read_timeout: DEFAULT_READ_TIMEOUT,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Sets the number of attempts (at least one is always made).
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the per-read timeout.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives request/reply round trips over a transport.
#[derive(Debug, Default)]
pub struct TransactionEngine {
    config: TransactionConfig,
    decoder: FrameDecoder,
}

impl TransactionEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: TransactionConfig) -> Self {
        Self {
            config,
            decoder: FrameDecoder::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: TransactionConfig) {
        self.config = config;
    }

    /// Drops any buffered input.
    pub fn reset(&mut self) {
        self.decoder.clear();
    }

    /// Runs one transaction, retrying spoiled attempts.
    ///
    /// Returns the raw reply payload (never empty). Exhausting every attempt
    /// yields `Error::RetriesExhausted` carrying the last attempt's error.
    pub async fn execute<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        request: &Request,
    ) -> Result<Bytes> {
        let attempts = self.config.max_attempts.max(1);
        let mut last = Error::EmptyReply;

        for attempt in 1..=attempts {
            match self.execute_once(transport, request).await {
                Ok(reply) => {
                    if attempt > 1 {
                        tracing::debug!("{:?} succeeded on attempt {}", request.opcode(), attempt);
                    }
                    return Ok(reply);
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        "{:?} attempt {}/{} failed: {}",
                        request.opcode(),
                        attempt,
                        attempts,
                        e
                    );
                    last = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::RetriesExhausted {
            attempts,
            last: Box::new(last),
        })
    }

    /// Runs a single attempt without retrying.
    pub async fn execute_once<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        request: &Request,
    ) -> Result<Bytes> {
        // A late reply to an earlier request must not pass for this one
        self.decoder.clear();
        transport.reset_input_buffer()?;

        let frame = encode_frame(request.payload());
        let mut out = BytesMut::with_capacity(frame.len() + LINE_TRAILER.len());
        out.put_slice(&frame);
        out.put_slice(LINE_TRAILER);

        tracing::trace!("sending frame: {}", hex::encode(&frame));
        transport.write(out.freeze()).await?;

        let reply = self.read_reply(transport).await?;
        tracing::trace!("received payload: {}", hex::encode(&reply));

        if reply.is_empty() {
            return Err(Error::EmptyReply);
        }
        Ok(reply)
    }

    async fn read_reply<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<Bytes> {
        let deadline = Instant::now() + self.config.attempt_timeout;
        let mut buf = [0u8; READ_CHUNK];

        loop {
            if let Some(payload) = self.decoder.decode()? {
                return Ok(payload);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            let attempt_expired = Error::AttemptTimeout {
                timeout_ms: millis(self.config.attempt_timeout),
            };
            if remaining.is_zero() {
                return Err(attempt_expired);
            }

            let wait = self.config.read_timeout.min(remaining);
            let Ok(read) = tokio::time::timeout(wait, transport.read(&mut buf)).await else {
                if wait < self.config.read_timeout {
                    return Err(attempt_expired);
                }
                return Err(Error::Timeout {
                    timeout_ms: millis(wait),
                });
            };

            let n = read?;
            if n == 0 {
                tracing::debug!("serial line closed");
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "serial line closed",
                )));
            }

            tracing::trace!("received {} bytes", n);
            self.decoder.feed(&buf[..n]);
        }
    }
}
