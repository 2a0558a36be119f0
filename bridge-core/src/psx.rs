//! PSX (PlayStation) controller polling.
//!
//! One poll is a strict 9-byte exchange inside a single attention bracket.
//! The attention line is the chip-select of the [`SpiDevice`] handed to
//! [`PsxController::new`].
//!
//! ```text
//! host:  0x01  0x42  0x00  0xFF  0xFF  0xFF  0xFF  0xFF  0xFF
//! pad:    --    id   0x5A  btn1  btn2   RX    RY    LX    LY
//! ```
//!
//! Everything after the 0x5A ready marker is active-low on the wire and is
//! inverted here, so a pressed button reads as a set bit and a stick pushed
//! fully right or down reads 0xFF.

use crate::bus::exchange_spaced;
use crate::input::{ControllerError, ControllerSource};
use embedded_hal::spi::SpiDevice;
use link_proto::{AnalogStick, Buttons, ControllerFrame};

/// Bytes shifted out for one poll.
pub const POLL_COMMAND: [u8; POLL_LEN] = [0x01, 0x42, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

/// Length of a poll exchange.
pub const POLL_LEN: usize = 9;

/// Order in which the SPI transport shifts the bits of a byte.
///
/// The controller bus is LSB-first. Transports that can only shift
/// MSB-first are still usable: the driver then mirrors every byte before
/// sending and after receiving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    #[default]
    LsbFirst,
    MsbFirst,
}

/// Controller bus settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PsxConfig {
    /// Pause after every byte, with attention still asserted.
    pub byte_delay_us: u32,
    /// Shift order of the underlying transport.
    pub bit_order: BitOrder,
}

impl Default for PsxConfig {
    fn default() -> Self {
        Self {
            byte_delay_us: 10,
            bit_order: BitOrder::LsbFirst,
        }
    }
}

/// PSX controller on a dedicated attention line.
pub struct PsxController<SPI> {
    spi: SPI,
    config: PsxConfig,
}

impl<SPI: SpiDevice> PsxController<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self::with_config(spi, PsxConfig::default())
    }

    pub fn with_config(spi: SPI, config: PsxConfig) -> Self {
        Self { spi, config }
    }

    #[must_use]
    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.config.bit_order = bit_order;
        self
    }

    pub fn config(&self) -> &PsxConfig {
        &self.config
    }

    /// Run one poll exchange and decode it.
    ///
    /// Always yields a fully populated frame. Nothing here checks that a
    /// controller is actually attached; a floating data line simply decodes
    /// as whatever was sampled.
    pub fn poll(&mut self) -> Result<ControllerFrame, ControllerError> {
        let mut raw = POLL_COMMAND;
        self.mirror_if_needed(&mut raw);
        exchange_spaced(
            &mut self.spi,
            &mut raw,
            0,
            self.config.byte_delay_us.saturating_mul(1_000),
        )?;
        self.mirror_if_needed(&mut raw);

        #[cfg(feature = "defmt")]
        defmt::trace!("psx raw {=[u8]:02x}", &raw[..]);

        Ok(decode(&raw))
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    fn mirror_if_needed(&self, bytes: &mut [u8]) {
        if self.config.bit_order == BitOrder::MsbFirst {
            for byte in bytes.iter_mut() {
                *byte = byte.reverse_bits();
            }
        }
    }
}

impl<SPI: SpiDevice> ControllerSource for PsxController<SPI> {
    fn read_frame(&mut self) -> Result<ControllerFrame, ControllerError> {
        self.poll()
    }
}

/// Decode the controller's replies to [`POLL_COMMAND`].
///
/// Byte 0 is ignored. Byte 1 (pad type) and byte 2 (ready marker) are
/// kept as received.
#[must_use]
pub fn decode(raw: &[u8; POLL_LEN]) -> ControllerFrame {
    ControllerFrame {
        id: raw[1],
        ready: raw[2],
        buttons: Buttons::from_wire(!raw[3], !raw[4]),
        right_stick: AnalogStick::new(!raw[5], !raw[6]),
        left_stick: AnalogStick::new(!raw[7], !raw[8]),
    }
}
