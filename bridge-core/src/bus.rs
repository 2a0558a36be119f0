//! Byte-spaced exchanges over a shared SPI bus.
//!
//! Both peripherals on the bus need a settling gap after every byte while
//! their select line is still held, so an exchange is built as one
//! [`SpiDevice::transaction`] alternating single-byte transfers and
//! [`Operation::DelayNs`]. An optional lead delay sits between select
//! assertion and the first byte. The device deasserts chip-select when the
//! transaction ends, on success or error.

use embedded_hal::spi::{Operation, SpiDevice};
use heapless::Vec;

/// Longest exchange on the bus: one command byte plus a 32-byte payload.
pub const MAX_EXCHANGE: usize = 33;

/// Error from a spaced exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeError<E> {
    /// The SPI device reported an error.
    Spi(E),
    /// More than [`MAX_EXCHANGE`] bytes were requested.
    TooLong,
}

/// Exchange `bytes` in place inside a single chip-select bracket.
///
/// A non-zero `lead_ns` is waited out after chip-select asserts and before
/// the first byte. Each byte is then shifted out on its own and followed by
/// `spacing_ns` of delay; on return every byte holds what the peripheral
/// sent back.
pub fn exchange_spaced<SPI: SpiDevice>(
    spi: &mut SPI,
    bytes: &mut [u8],
    lead_ns: u32,
    spacing_ns: u32,
) -> Result<(), ExchangeError<SPI::Error>> {
    if bytes.len() > MAX_EXCHANGE {
        return Err(ExchangeError::TooLong);
    }

    let mut ops: Vec<Operation<'_, u8>, { 2 * MAX_EXCHANGE + 1 }> = Vec::new();
    if lead_ns > 0 {
        ops.push(Operation::DelayNs(lead_ns))
            .map_err(|_| ExchangeError::TooLong)?;
    }
    for byte in bytes.chunks_mut(1) {
        ops.push(Operation::TransferInPlace(byte))
            .and_then(|()| ops.push(Operation::DelayNs(spacing_ns)))
            .map_err(|_| ExchangeError::TooLong)?;
    }

    spi.transaction(&mut ops).map_err(ExchangeError::Spi)
}
