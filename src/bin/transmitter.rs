#![no_std]
#![no_main]

use core::cell::RefCell;
use defmt::{error, info};
use defmt_rtt as _;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDeviceWithConfig;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::Spi;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Timer};
use psx_radio_bridge::board::{controller_spi_config, radio_spi_config, SharedSpi};
use psx_radio_bridge::{BitOrder, Nrf24, PsxController, RadioBridge, RadioConfig};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

/// SPI0, shared by the radio and the controller.
static SPI_BUS: StaticCell<SharedSpi> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("PSX radio transmitter starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- SPI Setup ---
    let spi = Spi::new_blocking(
        p.SPI0,
        p.PIN_18, // SCK
        p.PIN_19, // MOSI
        p.PIN_16, // MISO
        radio_spi_config(),
    );
    let bus = SPI_BUS.init(Mutex::new(RefCell::new(spi)));

    // Both select lines idle high so neither device listens during bring-up
    let radio_spi = SpiDeviceWithConfig::new(bus, Output::new(p.PIN_17, Level::High), radio_spi_config());
    let pad_spi = SpiDeviceWithConfig::new(bus, Output::new(p.PIN_21, Level::High), controller_spi_config());

    // --- Radio Setup ---
    let mut radio = Nrf24::new(radio_spi, Output::new(p.PIN_20, Level::Low), Delay);
    let config = RadioConfig::transmitter();
    while let Err(e) = radio.init(&config) {
        error!("Radio init failed: {:?}, retrying", e);
        Timer::after_millis(500).await;
    }
    info!("Radio ready on channel {}", config.channel);

    // --- Controller Setup ---
    let pad = PsxController::new(pad_spi).with_bit_order(BitOrder::MsbFirst);

    // Fault indicator (on-board LED on Pico)
    let led = Output::new(p.PIN_25, Level::Low);

    info!("Bridge running");
    RadioBridge::new(pad, radio, led, Delay).run()
}
