//! Telemetry sink trait and error types.

use crate::bus::ExchangeError;
use crate::nrf24::{ConfigError, ObserveTx, Status};
use embedded_hal::spi::ErrorKind;
use link_proto::TelemetryFrame;

/// Error type for radio operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// SPI transaction failed.
    Bus(ErrorKind),
    /// Driving the chip-enable line failed.
    Pin,
    /// Payload longer than the chip's 32-byte FIFO entry.
    PayloadLength,
    /// The radio has not been through `init` yet.
    NotInitialized,
    /// Operation not available in the configured role.
    WrongRole,
    /// Rejected configuration.
    Config(ConfigError),
}

impl From<ConfigError> for RadioError {
    fn from(err: ConfigError) -> Self {
        RadioError::Config(err)
    }
}

impl<E: embedded_hal::spi::Error> From<ExchangeError<E>> for RadioError {
    fn from(err: ExchangeError<E>) -> Self {
        match err {
            ExchangeError::Spi(e) => RadioError::Bus(e.kind()),
            ExchangeError::TooLong => RadioError::PayloadLength,
        }
    }
}

/// Destination for telemetry frames with observable delivery failure.
///
/// Sending does not report whether the peer acknowledged; that is read back
/// separately through [`transmission_status`](Self::transmission_status),
/// and a failure flag stays latched until [`clear_fault`](Self::clear_fault).
pub trait TelemetrySink {
    /// Hand one frame to the air interface.
    fn send_frame(&mut self, frame: &TelemetryFrame) -> Result<(), RadioError>;

    /// Sample the delivery flags of the last send.
    fn transmission_status(&mut self) -> Result<Status, RadioError>;

    /// Clear latched delivery flags so the next send starts clean.
    fn clear_fault(&mut self) -> Result<(), RadioError>;

    /// Retransmission counters, for diagnostics after a fault.
    fn retransmit_stats(&mut self) -> Result<ObserveTx, RadioError>;
}
