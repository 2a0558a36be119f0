//! Platform-agnostic drivers and bridge loop for the PSX radio link.
//!
//! This crate holds everything the transmitter does that does not depend on
//! a particular microcontroller. Hardware is reached only through
//! `embedded-hal` 1.0 traits, so the same code runs on the RP2040 and in
//! host tests.
//!
//! # Overview
//!
//! - [`nrf24`]: nRF24L01 driver ([`Nrf24`], [`RadioConfig`], [`Status`])
//! - [`psx`]: PSX controller driver ([`PsxController`], [`decode`])
//! - [`input`]: Controller source trait ([`ControllerSource`])
//! - [`output`]: Telemetry sink trait ([`TelemetrySink`])
//! - [`bridge`]: Poll, send and fault-check loop ([`RadioBridge`])
//! - [`bus`]: Byte-spaced SPI exchanges shared by both drivers
//!
//! # Shared Bus
//!
//! The radio and the controller sit on one SPI bus with separate select
//! lines. Each driver owns its own [`SpiDevice`](embedded_hal::spi::SpiDevice),
//! whose chip-select is the radio's CSN or the controller's attention line,
//! and every operation is a single transaction. A select line is therefore
//! never left asserted between operations and never asserted for both
//! peripherals at once.
//!
//! # Example
//!
//! ```rust
//! use bridge_core::psx::decode;
//! use link_proto::{Buttons, TelemetryFrame};
//!
//! // CROSS held, left stick pushed fully left
//! let raw = [0xFF, 0x73, 0x5A, 0xFF, 0xBF, 0x7F, 0x7F, 0xFF, 0x7F];
//! let pad = decode(&raw);
//! assert_eq!(pad.buttons, Buttons::CROSS);
//!
//! let frame = TelemetryFrame::from(&pad);
//! assert_eq!(frame.to_bytes(), [0x40, 0x00, 0x00, 0x80, 0x00]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and driver logging

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod bus;
pub mod input;
pub mod nrf24;
pub mod output;
pub mod psx;

#[cfg(test)]
mod mock;

// Re-export main types at crate root
pub use bridge::{BridgeError, BridgeTiming, CycleReport, CycleState, RadioBridge};
pub use input::{ControllerError, ControllerSource};
pub use nrf24::{Nrf24, RadioConfig, RadioTiming, Role, Status, TransmissionOutcome};
pub use output::{RadioError, TelemetrySink};
pub use psx::{decode, BitOrder, PsxConfig, PsxController};
