//! Bus settings shared by both firmware images.

use core::cell::RefCell;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Config, Phase, Polarity, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// nRF24L01 SPI clock.
pub const RADIO_SPI_HZ: u32 = 1_000_000;

/// PSX controller SPI clock.
pub const CONTROLLER_SPI_HZ: u32 = 250_000;

/// Receive window on the receiving peer, short enough to keep USB serviced.
pub const RECEIVER_LISTEN_MS: u32 = 5;

/// The SPI0 bus, shared by every device on it.
pub type SharedSpi = Mutex<NoopRawMutex, RefCell<Spi<'static, SPI0, Blocking>>>;

/// Mode 0, MSB-first.
#[must_use]
pub fn radio_spi_config() -> Config {
    let mut config = Config::default();
    config.frequency = RADIO_SPI_HZ;
    config.phase = Phase::CaptureOnFirstTransition;
    config.polarity = Polarity::IdleLow;
    config
}

/// Mode 3. The controller is LSB-first, which the PL022 cannot shift, so
/// the driver mirrors bytes itself (see [`bridge_core::BitOrder`]).
#[must_use]
pub fn controller_spi_config() -> Config {
    let mut config = Config::default();
    config.frequency = CONTROLLER_SPI_HZ;
    config.phase = Phase::CaptureOnSecondTransition;
    config.polarity = Polarity::IdleHigh;
    config
}
