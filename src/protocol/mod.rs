//! Protocol definitions for gamebot communication.
//!
//! This module contains the low-level protocol types including:
//! - Frame encoding/decoding
//! - Request opcodes and reply status codes
//! - Request payload builders
//! - Reply parsing

pub mod command;
pub mod frame;
pub mod parser;
pub mod request;

pub use command::{Opcode, ReplyStatus};
pub use frame::{
    FRAME_END, FRAME_START, FrameDecoder, LINE_TRAILER, MAX_PAYLOAD_SIZE, checksum,
    encode as encode_frame, try_encode as try_encode_frame,
};
pub use parser::{QUERY_STATE_REPLY_SIZE, parse_alive, parse_query_state, parse_status};
pub use request::Request;
