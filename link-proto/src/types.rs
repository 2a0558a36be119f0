//! Controller types: Buttons, AnalogStick, ControllerFrame.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Marker a ready controller answers with during the third exchange, right
/// after its identity byte.
pub const CONTROLLER_READY: u8 = 0x5A;

/// Button state as reported by the controller, already converted to
/// active-high (a set bit means pressed).
///
/// Bit positions follow the order the controller shifts them out: the first
/// button byte on the wire lands in the high byte.
///
/// # Example
///
/// ```
/// use link_proto::Buttons;
///
/// let buttons = Buttons::CROSS | Buttons::CIRCLE;
/// assert!(buttons.contains(Buttons::CROSS));
/// assert!(!buttons.contains(Buttons::SQUARE));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u16);

impl Buttons {
    pub const L2: Self = Self(1 << 0);
    pub const R2: Self = Self(1 << 1);
    pub const L1: Self = Self(1 << 2);
    pub const R1: Self = Self(1 << 3);
    pub const TRIANGLE: Self = Self(1 << 4);
    pub const CIRCLE: Self = Self(1 << 5);
    pub const CROSS: Self = Self(1 << 6);
    pub const SQUARE: Self = Self(1 << 7);
    pub const SELECT: Self = Self(1 << 8);
    pub const L3: Self = Self(1 << 9); // Left stick press
    pub const R3: Self = Self(1 << 10); // Right stick press
    pub const START: Self = Self(1 << 11);
    pub const UP: Self = Self(1 << 12);
    pub const RIGHT: Self = Self(1 << 13);
    pub const DOWN: Self = Self(1 << 14);
    pub const LEFT: Self = Self(1 << 15);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Every button pressed.
    pub const ALL: Self = Self(0xFFFF);

    /// Build the bitfield from the two inverted bytes in wire order.
    #[inline]
    #[must_use]
    pub const fn from_wire(first: u8, second: u8) -> Self {
        Self(((first as u16) << 8) | second as u16)
    }

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Buttons, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Get the raw u16 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Buttons {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Buttons {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Buttons {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// Analog stick position, 0-255 on each axis with 0x80 near centre.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogStick {
    pub x: u8,
    pub y: u8,
}

impl AnalogStick {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub const CENTERED: Self = Self { x: 0x80, y: 0x80 };
}

/// Decoded state of one controller poll.
///
/// Built fresh on every poll cycle and consumed immediately; nothing carries
/// over between cycles.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerFrame {
    /// Byte returned while sending the second command byte (pad type,
    /// e.g. 0x41 digital, 0x73 analog).
    pub id: u8,
    /// Byte returned while sending the third command byte.
    pub ready: u8,
    pub buttons: Buttons,
    pub left_stick: AnalogStick,
    pub right_stick: AnalogStick,
}

impl ControllerFrame {
    /// A ready controller with nothing pressed and both sticks centred.
    #[must_use]
    pub const fn released() -> Self {
        Self {
            // digital pad
            id: 0x41,
            ready: CONTROLLER_READY,
            buttons: Buttons::NONE,
            left_stick: AnalogStick::CENTERED,
            right_stick: AnalogStick::CENTERED,
        }
    }

    /// Whether the controller identified itself as ready to send data,
    /// i.e. the byte following the identity is [`CONTROLLER_READY`].
    ///
    /// Nothing in the poll path enforces this; it exists for diagnostics.
    #[inline]
    #[must_use]
    pub const fn identity_matches(&self) -> bool {
        self.ready == CONTROLLER_READY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_from_wire_orders_bytes() {
        let buttons = Buttons::from_wire(0x12, 0x34);
        assert_eq!(buttons.raw(), 0x1234);
        assert!(buttons.contains(Buttons::L3));
        assert!(!buttons.contains(Buttons::R3));
        assert!(buttons.contains(Buttons::UP));
        assert!(buttons.contains(Buttons::L1));
    }

    #[test]
    fn test_dpad_lives_in_high_byte() {
        let dpad = Buttons::UP | Buttons::RIGHT | Buttons::DOWN | Buttons::LEFT;
        assert_eq!(dpad.raw(), 0xF000);

        let face = Buttons::TRIANGLE | Buttons::CIRCLE | Buttons::CROSS | Buttons::SQUARE;
        assert_eq!(face.raw(), 0x00F0);
    }

    #[test]
    fn test_buttons_set_clear() {
        let mut buttons = Buttons::NONE;
        buttons.set(Buttons::START, true);
        assert!(buttons.contains(Buttons::START));
        buttons.set(Buttons::START, false);
        assert!(buttons.is_empty());
    }

    #[test]
    fn test_identity_matches() {
        let mut frame = ControllerFrame::released();
        assert!(frame.identity_matches());

        // Pad type does not matter, only the ready marker
        frame.id = 0x73;
        assert!(frame.identity_matches());

        frame.ready = 0xFF;
        assert!(!frame.identity_matches());
    }
}
