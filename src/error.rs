//! Error types for the gamebot library.

use thiserror::Error;

use crate::protocol::ReplyStatus;

/// The main error type for gamebot operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Session is not open.
    #[error("not connected")]
    NotConnected,

    /// Frame encoding/decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A single read waited longer than the configured bound.
    #[error("read timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// No complete reply frame arrived within the attempt bound.
    #[error("no complete reply within {timeout_ms}ms")]
    AttemptTimeout { timeout_ms: u64 },

    /// A well-formed frame arrived with no payload.
    #[error("empty reply")]
    EmptyReply,

    /// Every attempt of a transaction failed.
    #[error("no valid reply after {attempts} attempts (last: {last})")]
    RetriesExhausted { attempts: u32, last: Box<Error> },

    /// The peripheral answered coherently but not with what the request expects.
    #[error("protocol violation: {message}")]
    ProtocolViolation { message: String },

    /// A raw request carries more parameter bytes than any request takes.
    #[error("request parameters too long: {len} bytes exceeds maximum {max}")]
    ParamsTooLong { len: usize, max: usize },

    /// The peripheral answered with an error status.
    #[error("request rejected with status {status}")]
    Rejected { status: ReplyStatus },
}

impl Error {
    /// Returns true if the underlying line is unusable.
    ///
    /// Transport errors are never retried.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Serial(_) | Self::Io(_) | Self::NotConnected)
    }

    /// Returns true if the error only spoils the current attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Frame(_) | Self::Timeout { .. } | Self::AttemptTimeout { .. } | Self::EmptyReply
        )
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
        }
    }
}

/// Frame-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The two copies of the length nibble disagree.
    #[error("length field corrupted: nibbles {low:#x} and {high:#x} differ")]
    LengthMismatch { low: u8, high: u8 },

    /// The byte after the checksum is not the end marker.
    #[error("missing end marker: found {found:#04x}")]
    MissingEndMarker { found: u8 },

    /// Checksum over the payload does not match.
    #[error("checksum mismatch: frame carries {expected:#04x}, payload hashes to {actual:#04x}")]
    Checksum { expected: u8, actual: u8 },

    /// Payload does not fit the 4-bit length field.
    #[error("payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },
}

impl FrameError {
    /// Returns true for structural errors (length field or end marker).
    #[must_use]
    pub const fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::LengthMismatch { .. } | Self::MissingEndMarker { .. }
        )
    }

    /// Returns true for checksum mismatches.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::Checksum { .. })
    }
}

/// Result type alias for gamebot operations.
pub type Result<T> = std::result::Result<T, Error>;
