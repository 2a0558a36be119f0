//! The 5-byte telemetry frame carried in every radio payload.
//!
//! The layout is the compatibility contract with the receiving peer and must
//! not change length or byte order:
//!
//! | Offset | Meaning |
//! |--------|---------|
//! | 0 | buttons low byte |
//! | 1 | buttons high byte |
//! | 2 | left stick X |
//! | 3 | left stick Y |
//! | 4 | reserved, always 0x00 |
//!
//! The right stick is polled but not forwarded.

use crate::types::{AnalogStick, Buttons, ControllerFrame};

/// Length of a telemetry frame on the wire.
pub const FRAME_LEN: usize = 5;

/// Error decoding a received payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload is not exactly [`FRAME_LEN`] bytes.
    Length,
}

/// Application payload sent once per bridge cycle.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryFrame {
    pub buttons: Buttons,
    pub left_stick: AnalogStick,
}

impl TelemetryFrame {
    /// Serialize to the wire layout.
    #[inline]
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let buttons = self.buttons.0.to_le_bytes();
        [
            buttons[0],
            buttons[1],
            self.left_stick.x,
            self.left_stick.y,
            0x00,
        ]
    }

    /// Decode a received payload.
    ///
    /// The reserved byte is ignored so a future peer may start using it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let bytes: &[u8; FRAME_LEN] = bytes.try_into().map_err(|_| FrameError::Length)?;

        Ok(Self {
            buttons: Buttons(u16::from_le_bytes([bytes[0], bytes[1]])),
            left_stick: AnalogStick::new(bytes[2], bytes[3]),
        })
    }
}

impl From<&ControllerFrame> for TelemetryFrame {
    fn from(frame: &ControllerFrame) -> Self {
        Self {
            buttons: frame.buttons,
            left_stick: frame.left_stick,
        }
    }
}
