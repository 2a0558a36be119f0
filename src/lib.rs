//! PSX controller to 2.4GHz radio bridge for RP2040.
//!
//! This crate holds the board-specific half of the link. The drivers and the
//! bridge loop live in [`bridge_core`]; the wire format in [`link_proto`].
//!
//! # Overview
//!
//! Two firmware images are built from this package:
//!
//! - **`transmitter`**: polls a PSX controller every 20ms and sends its
//!   buttons and left stick to the peer radio. Pulses the on-board LED
//!   whenever a frame went unacknowledged.
//! - **`receiver`**: listens for frames and presents them to the host as a
//!   USB HID gamepad.
//!
//! # Hardware Configuration
//!
//! | Function        | GPIO | Description |
//! |-----------------|------|-------------|
//! | SPI0 SCK        | 18   | Shared bus clock |
//! | SPI0 TX (MOSI)  | 19   | Shared bus data out |
//! | SPI0 RX (MISO)  | 16   | Shared bus data in (external pull-up for the controller) |
//! | Radio CSN       | 17   | nRF24L01 chip select |
//! | Radio CE        | 20   | nRF24L01 chip enable |
//! | Radio IRQ       | 22   | Not used, status is polled |
//! | Controller ATT  | 21   | PSX attention (chip select) |
//! | LED             | 25   | On-board LED (delivery fault indicator) |
//!
//! The controller needs mode 3 at a few hundred kHz and the radio mode 0;
//! [`board`] holds both bus configurations, applied per transaction.
//!
//! # Modules
//!
//! - [`board`]: SPI bus settings and the shared bus type
//! - [`usb_output`]: USB HID output ([`UsbHidOutput`], [`GamepadReport`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features - they install conflicting panic handlers");

// Re-export core types for convenience
pub use bridge_core::{
    BitOrder, BridgeError, BridgeTiming, ControllerError, ControllerSource, CycleReport,
    CycleState, Nrf24, PsxConfig, PsxController, RadioBridge, RadioConfig, RadioError,
    RadioTiming, Role, Status, TelemetrySink, TransmissionOutcome,
};
pub use link_proto::{AnalogStick, Buttons, ControllerFrame, FrameError, TelemetryFrame, FRAME_LEN};

pub mod board;
pub mod usb_output;

pub use usb_output::{configure_usb_hid, GamepadReport, UsbHidOutput};
