//! Controller source trait and error types.

use crate::bus::ExchangeError;
use embedded_hal::spi::ErrorKind;
use link_proto::ControllerFrame;

/// Error type for controller polling.
///
/// A missing or misbehaving controller is not an error at this level: the
/// exchange still completes and yields whatever bytes came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// SPI transaction failed.
    Bus(ErrorKind),
}

impl<E: embedded_hal::spi::Error> From<ExchangeError<E>> for ControllerError {
    fn from(err: ExchangeError<E>) -> Self {
        match err {
            ExchangeError::Spi(e) => ControllerError::Bus(e.kind()),
            ExchangeError::TooLong => ControllerError::Bus(ErrorKind::Other),
        }
    }
}

/// Source of controller state, polled once per bridge cycle.
pub trait ControllerSource {
    /// Run one full poll exchange and return the decoded state.
    fn read_frame(&mut self) -> Result<ControllerFrame, ControllerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_error_keeps_kind() {
        let err = ControllerError::from(ExchangeError::Spi(ErrorKind::Overrun));
        assert_eq!(err, ControllerError::Bus(ErrorKind::Overrun));
    }

    #[test]
    fn test_oversized_exchange_maps_to_other() {
        let err = ControllerError::from(ExchangeError::<ErrorKind>::TooLong);
        assert_eq!(err, ControllerError::Bus(ErrorKind::Other));
    }
}
