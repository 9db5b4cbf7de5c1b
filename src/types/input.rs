//! Input state types: buttons, hat and analog sticks.

use std::ops::{BitOr, BitOrAssign};

/// Button bitmask, sent big-endian as two bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Buttons(u16);

impl Buttons {
    /// No buttons pressed.
    pub const NONE: Self = Self(0);
    pub const Y: Self = Self(0x0001);
    pub const B: Self = Self(0x0002);
    pub const A: Self = Self(0x0004);
    pub const X: Self = Self(0x0008);
    pub const L: Self = Self(0x0010);
    pub const R: Self = Self(0x0020);
    pub const ZL: Self = Self(0x0040);
    pub const ZR: Self = Self(0x0080);
    pub const MINUS: Self = Self(0x0100);
    pub const PLUS: Self = Self(0x0200);
    /// Left stick click.
    pub const LCLICK: Self = Self(0x0400);
    /// Right stick click.
    pub const RCLICK: Self = Self(0x0800);
    pub const HOME: Self = Self(0x1000);
    pub const CAPTURE: Self = Self(0x2000);

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check if every button in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for Buttons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Hat (d-pad) direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Hat {
    Top = 0x00,
    TopRight = 0x01,
    Right = 0x02,
    BottomRight = 0x03,
    Bottom = 0x04,
    BottomLeft = 0x05,
    Left = 0x06,
    TopLeft = 0x07,
    /// Released.
    #[default]
    Center = 0x08,
}

impl Hat {
    /// Parses a hat direction from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Top),
            0x01 => Some(Self::TopRight),
            0x02 => Some(Self::Right),
            0x03 => Some(Self::BottomRight),
            0x04 => Some(Self::Bottom),
            0x05 => Some(Self::BottomLeft),
            0x06 => Some(Self::Left),
            0x07 => Some(Self::TopLeft),
            0x08 => Some(Self::Center),
            _ => None,
        }
    }
}

impl From<Hat> for u8 {
    fn from(hat: Hat) -> Self {
        hat as Self
    }
}

/// Lowest stick axis value (full left / full up).
pub const STICK_MIN: u8 = 0x00;

/// Resting stick axis value.
pub const STICK_CENTER: u8 = 0x80;

/// Highest stick axis value (full right / full down).
pub const STICK_MAX: u8 = 0xFF;

/// Saturates an axis value into `STICK_MIN..=STICK_MAX`.
#[must_use]
pub fn clamp_axis(value: i32) -> u8 {
    value.clamp(i32::from(STICK_MIN), i32::from(STICK_MAX)) as u8
}

/// Position of one analog stick.
///
/// X grows to the right, Y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StickPosition {
    pub x: u8,
    pub y: u8,
}

impl StickPosition {
    /// Stick at rest.
    pub const CENTER: Self = Self {
        x: STICK_CENTER,
        y: STICK_CENTER,
    };

    /// Creates a position, saturating out-of-range axes.
    #[must_use]
    pub fn clamped(x: i32, y: i32) -> Self {
        Self {
            x: clamp_axis(x),
            y: clamp_axis(y),
        }
    }

    /// Maps a polar direction onto the two axes.
    ///
    /// `heading_degrees` is 0 for up and grows clockwise (90 = right).
    /// `extent` is the deflection, 0.0 at rest and 1.0 at full travel.
    #[must_use]
    pub fn from_heading(heading_degrees: f64, extent: f64) -> Self {
        let radians = heading_degrees.to_radians();
        let radius = extent * f64::from(STICK_MAX - STICK_CENTER);
        let center = i32::from(STICK_CENTER);
        let dx = (radians.sin() * radius).round() as i32;
        let dy = (radians.cos() * radius).round() as i32;
        Self::clamped(center + dx, center - dy)
    }
}

impl Default for StickPosition {
    fn default() -> Self {
        Self::CENTER
    }
}
