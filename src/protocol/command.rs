//! Request opcodes and reply status codes for the gamebot protocol.
//!
//! Every request payload starts with a single printable ASCII opcode,
//! optionally followed by parameters in big-endian byte order.

use std::fmt;

/// Request opcodes sent to the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Liveness check, replies `A`.
    Test = b'T',
    /// Query queue and counter state.
    QueryState = b'Q',
    /// Debug hook.
    Debug = b'D',
    /// Fetch the last USB OUT report.
    GetUsbOutData = b'O',
    /// Set every input at once.
    SetAll = b'S',
    /// Set buttons.
    SetButtons = b'B',
    /// Set left stick.
    SetLeftJoy = b'L',
    /// Set right stick.
    SetRightJoy = b'R',
    /// Set hat.
    SetHat = b'H',
    /// Release every input.
    UnsetAll = b'U',
    /// Set the default press duration.
    SetDownMsec = b'M',
    /// Press buttons, hat and both sticks together.
    PressAll = b's',
    /// Press buttons.
    PressButtons = b'b',
    /// Move left stick.
    MoveLeftJoy = b'l',
    /// Move right stick.
    MoveRightJoy = b'r',
    /// Press hat.
    PressHat = b'h',
    /// Drop queued commands and reset state.
    ClearState = b'C',
    /// Queue a pause.
    PauseMsec = b'P',
    /// Report pending commands.
    ReportPending = b'p',
}

impl Opcode {
    /// Attempts to parse an opcode from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'T' => Some(Self::Test),
            b'Q' => Some(Self::QueryState),
            b'D' => Some(Self::Debug),
            b'O' => Some(Self::GetUsbOutData),
            b'S' => Some(Self::SetAll),
            b'B' => Some(Self::SetButtons),
            b'L' => Some(Self::SetLeftJoy),
            b'R' => Some(Self::SetRightJoy),
            b'H' => Some(Self::SetHat),
            b'U' => Some(Self::UnsetAll),
            b'M' => Some(Self::SetDownMsec),
            b's' => Some(Self::PressAll),
            b'b' => Some(Self::PressButtons),
            b'l' => Some(Self::MoveLeftJoy),
            b'r' => Some(Self::MoveRightJoy),
            b'h' => Some(Self::PressHat),
            b'C' => Some(Self::ClearState),
            b'P' => Some(Self::PauseMsec),
            b'p' => Some(Self::ReportPending),
            _ => None,
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> Self {
        op as Self
    }
}

/// Single-byte reply codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyStatus {
    /// `0`: request accepted.
    Success,
    /// `1`: generic error.
    Error,
    /// `2`: command queue overflow.
    Overflow,
    /// `3`-`9`: reserved error classes.
    Reserved(u8),
    /// `A`: reply to `Test`.
    Alive,
}

impl ReplyStatus {
    /// Attempts to parse a reply status from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(Self::Success),
            b'1' => Some(Self::Error),
            b'2' => Some(Self::Overflow),
            b'3'..=b'9' => Some(Self::Reserved(byte - b'0')),
            b'A' => Some(Self::Alive),
            _ => None,
        }
    }

    /// Returns the wire byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Success => b'0',
            Self::Error => b'1',
            Self::Overflow => b'2',
            Self::Reserved(n) => b'0' + n,
            Self::Alive => b'A',
        }
    }

    /// Returns true for the numbered error classes.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Overflow | Self::Reserved(_))
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("0 (success)"),
            Self::Error => f.write_str("1 (error)"),
            Self::Overflow => f.write_str("2 (overflow)"),
            Self::Reserved(n) => write!(f, "{n}"),
            Self::Alive => f.write_str("A (alive)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_values() {
        assert_eq!(Opcode::Test as u8, b'T');
        assert_eq!(Opcode::QueryState as u8, b'Q');
        assert_eq!(Opcode::PressButtons as u8, b'b');
        assert_eq!(Opcode::PauseMsec as u8, b'P');
        assert_eq!(Opcode::ReportPending as u8, b'p');
    }

    #[test]
    fn test_opcode_from_byte() {
        assert_eq!(Opcode::from_byte(b'h'), Some(Opcode::PressHat));
        assert_eq!(Opcode::from_byte(b'H'), Some(Opcode::SetHat));
        assert_eq!(Opcode::from_byte(b'x'), None);
        let op: u8 = Opcode::ClearState.into();
        assert_eq!(op, b'C');
    }

    #[test]
    fn test_reply_status_from_byte() {
        assert_eq!(ReplyStatus::from_byte(b'0'), Some(ReplyStatus::Success));
        assert_eq!(ReplyStatus::from_byte(b'2'), Some(ReplyStatus::Overflow));
        assert_eq!(ReplyStatus::from_byte(b'7'), Some(ReplyStatus::Reserved(7)));
        assert_eq!(ReplyStatus::from_byte(b'A'), Some(ReplyStatus::Alive));
        assert_eq!(ReplyStatus::from_byte(b'Z'), None);
        assert_eq!(ReplyStatus::Reserved(7).as_byte(), b'7');
    }

    #[test]
    fn test_reply_status_is_error() {
        assert!(!ReplyStatus::Success.is_error());
        assert!(!ReplyStatus::Alive.is_error());
        assert!(ReplyStatus::Error.is_error());
        assert!(ReplyStatus::Reserved(9).is_error());
    }
}
