//! Wire types shared by both ends of the PSX radio link.
//!
//! This crate provides everything the transmitter and the receiver have to
//! agree on:
//!
//! - **Types**: decoded controller state
//!   - [`Buttons`] - Active-high PSX button bitfield
//!   - [`AnalogStick`] - 8-bit stick position
//!   - [`ControllerFrame`] - One poll worth of controller state
//!
//! - **Frame**: the radio payload
//!   - [`TelemetryFrame`] - Fixed 5-byte telemetry frame
//!   - [`FrameError`] - Decoding failures on the receiving side
//!
//! - **Link**: constants both radios must be configured with
//!   - [`LINK_ADDRESS`], [`LINK_CHANNEL`], [`PAYLOAD_WIDTH`]
//!
//! # Frame Format
//!
//! ```text
//! +--------+--------+--------+--------+--------+
//! | btn lo | btn hi | left X | left Y |  0x00  |
//! +--------+--------+--------+--------+--------+
//! ```
//!
//! # Example
//!
//! ```
//! use link_proto::{AnalogStick, Buttons, ControllerFrame, TelemetryFrame};
//!
//! let frame = ControllerFrame {
//!     buttons: Buttons::CROSS | Buttons::START,
//!     left_stick: AnalogStick::new(0x80, 0x7F),
//!     ..ControllerFrame::released()
//! };
//!
//! let bytes = TelemetryFrame::from(&frame).to_bytes();
//! assert_eq!(bytes, [0x40, 0x08, 0x80, 0x7F, 0x00]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod frame;
pub mod link;
pub mod types;

pub use frame::{FrameError, TelemetryFrame, FRAME_LEN};
pub use link::{LINK_ADDRESS, LINK_CHANNEL, PAYLOAD_WIDTH};
pub use types::{AnalogStick, Buttons, ControllerFrame, CONTROLLER_READY};
