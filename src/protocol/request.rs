//! Request payload builders.
//!
//! A request is an opcode followed by up to nine parameter bytes. Durations
//! are optional; leaving them out lets the peripheral apply its default
//! press duration.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::command::Opcode;
use crate::types::{Buttons, Hat, StickPosition};

/// Largest parameter block after the opcode (press-all with duration).
pub const MAX_PARAMS: usize = 9;

/// A request ready to be framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    opcode: Opcode,
    payload: Bytes,
}

impl Request {
    /// Creates a request with no parameters.
    #[must_use]
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            payload: Bytes::copy_from_slice(&[opcode.into()]),
        }
    }

    /// Creates a request with raw parameter bytes.
    ///
    /// # Panics
    ///
    /// Panics if `params` is longer than `MAX_PARAMS`.
    #[must_use]
    pub fn with_params(opcode: Opcode, params: &[u8]) -> Self {
        assert!(params.len() <= MAX_PARAMS, "request parameters too long");
        Self::build(opcode, params)
    }

    /// Creates a request with raw parameter bytes, rejecting oversized
    /// parameter blocks instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParamsTooLong` if `params` is longer than `MAX_PARAMS`.
    pub fn try_with_params(opcode: Opcode, params: &[u8]) -> Result<Self> {
        if params.len() > MAX_PARAMS {
            return Err(Error::ParamsTooLong {
                len: params.len(),
                max: MAX_PARAMS,
            });
        }
        Ok(Self::build(opcode, params))
    }

    fn build(opcode: Opcode, params: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(1 + params.len());
        buf.put_u8(opcode.into());
        buf.put_slice(params);
        Self {
            opcode,
            payload: buf.freeze(),
        }
    }

    /// `T`: liveness check.
    #[must_use]
    pub fn test() -> Self {
        Self::new(Opcode::Test)
    }

    /// `Q`: query queue and counter state.
    #[must_use]
    pub fn query_state() -> Self {
        Self::new(Opcode::QueryState)
    }

    /// `C`: drop queued commands and reset input state.
    #[must_use]
    pub fn clear_state() -> Self {
        Self::new(Opcode::ClearState)
    }

    /// `b`: press a set of buttons.
    #[must_use]
    pub fn press_buttons(buttons: Buttons, duration_ms: Option<u16>) -> Self {
        let mut buf = Self::start(Opcode::PressButtons);
        buf.put_u16(buttons.bits());
        put_duration(&mut buf, duration_ms);
        Self::finish(Opcode::PressButtons, buf)
    }

    /// `l`: deflect the left stick. Axes are saturated to 0..=255.
    #[must_use]
    pub fn move_left_joy(x: i32, y: i32, duration_ms: Option<u16>) -> Self {
        Self::stick(Opcode::MoveLeftJoy, StickPosition::clamped(x, y), duration_ms)
    }

    /// `r`: deflect the right stick. Axes are saturated to 0..=255.
    #[must_use]
    pub fn move_right_joy(x: i32, y: i32, duration_ms: Option<u16>) -> Self {
        Self::stick(Opcode::MoveRightJoy, StickPosition::clamped(x, y), duration_ms)
    }

    /// `h`: press the hat in one direction.
    #[must_use]
    pub fn press_hat(hat: Hat, duration_ms: Option<u16>) -> Self {
        let mut buf = Self::start(Opcode::PressHat);
        buf.put_u8(hat.into());
        put_duration(&mut buf, duration_ms);
        Self::finish(Opcode::PressHat, buf)
    }

    /// `s`: press buttons, hat and both sticks in one step.
    #[must_use]
    pub fn press_all(
        buttons: Buttons,
        hat: Hat,
        left: StickPosition,
        right: StickPosition,
        duration_ms: Option<u16>,
    ) -> Self {
        let mut buf = Self::start(Opcode::PressAll);
        buf.put_u16(buttons.bits());
        buf.put_u8(hat.into());
        buf.put_u8(left.x);
        buf.put_u8(left.y);
        buf.put_u8(right.x);
        buf.put_u8(right.y);
        put_duration(&mut buf, duration_ms);
        Self::finish(Opcode::PressAll, buf)
    }

    /// Builds a stick request from an already clamped position.
    #[must_use]
    pub fn stick(opcode: Opcode, position: StickPosition, duration_ms: Option<u16>) -> Self {
        let mut buf = Self::start(opcode);
        buf.put_u8(position.x);
        buf.put_u8(position.y);
        put_duration(&mut buf, duration_ms);
        Self::finish(opcode, buf)
    }

    fn start(opcode: Opcode) -> BytesMut {
        let mut buf = BytesMut::with_capacity(1 + MAX_PARAMS);
        buf.put_u8(opcode.into());
        buf
    }

    fn finish(opcode: Opcode, buf: BytesMut) -> Self {
        Self {
            opcode,
            payload: buf.freeze(),
        }
    }

    /// Returns the opcode.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Returns the full payload, opcode first.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Appends a big-endian duration; zero means "use the peripheral default".
fn put_duration(buf: &mut BytesMut, duration_ms: Option<u16>) {
    if let Some(ms) = duration_ms.filter(|&ms| ms > 0) {
        buf.put_u16(ms);
    }
}
