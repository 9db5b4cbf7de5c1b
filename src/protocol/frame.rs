//! Frame encoding and decoding for the gamebot serial protocol.
//!
//! The wire format uses a small self-checking frame:
//! ```text
//! ┌──────┬────────────┬────────────┬──────────┬──────┐
//! │ 0x50 │  length    │  payload   │ checksum │ 0x45 │
//! │ 'P'  │  1 byte    │ 0-15 bytes │  1 byte  │ 'E'  │
//! └──────┴────────────┴────────────┴──────────┴──────┘
//! ```
//!
//! The length byte carries the payload length in both nibbles, XORed with
//! `0xF0`. The checksum is the low byte of the CRC-32 of the payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use crc::{CRC_32_ISO_HDLC, Crc};

use crate::error::FrameError;

/// Start-of-frame marker.
pub const FRAME_START: u8 = b'P';

/// End-of-frame marker.
pub const FRAME_END: u8 = b'E';

/// Mask applied to the doubled-nibble length byte.
pub const LENGTH_MASK: u8 = 0xF0;

/// Maximum payload size (4-bit length field).
pub const MAX_PAYLOAD_SIZE: usize = 15;

/// Frame overhead (start, length, checksum, end).
pub const FRAME_OVERHEAD: usize = 4;

/// Trailer written after each request for readable console captures.
pub const LINE_TRAILER: &[u8] = b"\r\n";

/// CRC-32 as used by zlib and Ethernet.
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Returns the low 8 bits of the CRC-32 of `payload`.
#[inline]
#[must_use]
pub fn checksum(payload: &[u8]) -> u8 {
    (CRC32.checksum(payload) & 0xFF) as u8
}

/// Encodes a payload length into the masked doubled-nibble byte.
#[must_use]
pub const fn encode_length(len: u8) -> u8 {
    (len | (len << 4)) ^ LENGTH_MASK
}

/// Decodes a masked length byte.
///
/// # Errors
///
/// Returns `FrameError::LengthMismatch` if the two nibbles disagree.
pub const fn decode_length(byte: u8) -> Result<u8, FrameError> {
    let raw = byte ^ LENGTH_MASK;
    let low = raw & 0x0F;
    let high = raw >> 4;
    if low == high {
        Ok(low)
    } else {
        Err(FrameError::LengthMismatch { low, high })
    }
}

/// Encodes a payload into a framed message.
///
/// # Panics
///
/// Panics if the payload exceeds `MAX_PAYLOAD_SIZE`.
#[must_use]
pub fn encode(payload: &[u8]) -> Bytes {
    assert!(
        payload.len() <= MAX_PAYLOAD_SIZE,
        "payload exceeds maximum frame size"
    );

    let mut buf = BytesMut::with_capacity(FRAME_OVERHEAD + payload.len());
    buf.put_u8(FRAME_START);
    buf.put_u8(encode_length(payload.len() as u8));
    buf.put_slice(payload);
    buf.put_u8(checksum(payload));
    buf.put_u8(FRAME_END);
    buf.freeze()
}

/// Encodes a payload, rejecting oversized payloads instead of panicking.
///
/// # Errors
///
/// Returns `FrameError::PayloadTooLarge` if the payload exceeds `MAX_PAYLOAD_SIZE`.
pub fn try_encode(payload: &[u8]) -> Result<Bytes, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(encode(payload))
}

/// Frame decoder that handles partial data and line noise.
///
/// Bytes ahead of a start marker are discarded. A frame rejected for its
/// length byte or end marker only consumes the start marker, so decoding
/// again on the same buffer can still find a frame behind a stray `'P'`.
/// The transaction engine does not decode again: it ends the attempt on
/// the first error and clears the decoder before retrying.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Creates a new frame decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Feeds data into the decoder.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next complete frame.
    ///
    /// Returns `Ok(Some(payload))` if a complete frame was decoded,
    /// `Ok(None)` if more data is needed, or an error if the frame is invalid.
    ///
    /// # Errors
    ///
    /// Returns a `FrameError` if:
    /// - The length nibbles disagree
    /// - The end marker is missing
    /// - The checksum does not match the payload
    pub fn decode(&mut self) -> Result<Option<Bytes>, FrameError> {
        self.resync();

        if self.buffer.len() < 2 {
            return Ok(None);
        }

        let len = match decode_length(self.buffer[1]) {
            Ok(len) => usize::from(len),
            Err(e) => {
                // Drop only the start marker
                self.buffer.advance(1);
                return Err(e);
            }
        };

        let total = FRAME_OVERHEAD + len;
        if self.buffer.len() < total {
            return Ok(None);
        }

        let found = self.buffer[total - 1];
        if found != FRAME_END {
            self.buffer.advance(1);
            return Err(FrameError::MissingEndMarker { found });
        }

        let expected = self.buffer[2 + len];
        let actual = checksum(&self.buffer[2..2 + len]);

        self.buffer.advance(2);
        let payload = self.buffer.split_to(len).freeze();
        self.buffer.advance(2);

        if expected != actual {
            return Err(FrameError::Checksum { expected, actual });
        }

        Ok(Some(payload))
    }

    /// Discards everything ahead of the next start marker.
    fn resync(&mut self) {
        let skip = self
            .buffer
            .iter()
            .position(|&b| b == FRAME_START)
            .unwrap_or(self.buffer.len());
        if skip > 0 {
            tracing::debug!(
                "discarding {} bytes before frame start: {}",
                skip,
                hex::encode(&self.buffer[..skip])
            );
            self.buffer.advance(skip);
        }
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
