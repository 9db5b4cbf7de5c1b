//! Reply payload parsing for the gamebot protocol.
//!
//! Reply shapes are fixed per opcode; any other length is a protocol
//! violation rather than a framing problem.

use bytes::Buf;

use crate::error::{Error, Result};
use crate::protocol::command::{Opcode, ReplyStatus};
use crate::types::DeviceState;

/// Size of the `Q` reply, echoed opcode included.
pub const QUERY_STATE_REPLY_SIZE: usize = 14;

/// Parses a single-byte status reply.
pub fn parse_status(data: &[u8]) -> Result<ReplyStatus> {
    let [byte] = data else {
        return Err(Error::protocol(format!(
            "status reply must be 1 byte, got {}",
            data.len()
        )));
    };
    ReplyStatus::from_byte(*byte)
        .ok_or_else(|| Error::protocol(format!("unknown status byte {byte:#04x}")))
}

/// Parses the reply to `T`.
///
/// Anything other than a lone `A` is a valid "not alive" answer.
#[must_use]
pub fn parse_alive(data: &[u8]) -> bool {
    data == [ReplyStatus::Alive.as_byte()]
}

/// Parses the reply to `Q`.
///
/// Format (big-endian):
/// ```text
/// ['Q':1] [flags:1] [head:1] [tail:1] [count:1]
/// [interrupt_counter:4] [command_elapsed_counter:4] [echo_count:1]
/// ```
pub fn parse_query_state(data: &[u8]) -> Result<DeviceState> {
    if data.len() != QUERY_STATE_REPLY_SIZE {
        return Err(Error::protocol(format!(
            "query state reply must be {QUERY_STATE_REPLY_SIZE} bytes, got {}",
            data.len()
        )));
    }

    let mut cursor = std::io::Cursor::new(data);

    let echo = cursor.get_u8();
    if echo != u8::from(Opcode::QueryState) {
        return Err(Error::protocol(format!(
            "query state reply echoes {echo:#04x}"
        )));
    }

    Ok(DeviceState {
        flags: cursor.get_u8(),
        head: cursor.get_u8(),
        tail: cursor.get_u8(),
        count: cursor.get_u8(),
        interrupt_counter: cursor.get_u32(),
        command_elapsed_counter: cursor.get_u32(),
        echo_count: cursor.get_u8(),
    })
}
