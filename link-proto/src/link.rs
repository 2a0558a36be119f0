//! Radio parameters both peers have to be configured with.
//!
//! A transmitter and receiver only talk when address, channel and payload
//! width are identical on both ends.

use crate::frame::FRAME_LEN;

/// Pipe 0 receive address and transmit address (5 bytes wide).
pub const LINK_ADDRESS: [u8; 5] = [0x12, 0x12, 0x12, 0x12, 0x12];

/// RF channel, 2.400GHz + 1MHz per step.
pub const LINK_CHANNEL: u8 = 1;

/// Static payload width, one telemetry frame.
pub const PAYLOAD_WIDTH: u8 = FRAME_LEN as u8;
