#![no_std]
#![no_main]

use core::cell::RefCell;
use defmt::{debug, error, info, warn};
use defmt_rtt as _;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDeviceWithConfig;
use embassy_executor::Spawner;
use embassy_futures::join::join;
use embassy_futures::yield_now;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::USB;
use embassy_rp::spi::Spi;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Timer};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use psx_radio_bridge::board::{radio_spi_config, SharedSpi, RECEIVER_LISTEN_MS};
use psx_radio_bridge::{
    configure_usb_hid, GamepadReport, Nrf24, RadioConfig, RadioTiming, TelemetryFrame,
    UsbHidOutput, FRAME_LEN,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// SPI0, radio only on this side.
static SPI_BUS: StaticCell<SharedSpi> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("PSX radio receiver starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Radio Setup ---
    let spi = Spi::new_blocking(
        p.SPI0,
        p.PIN_18, // SCK
        p.PIN_19, // MOSI
        p.PIN_16, // MISO
        radio_spi_config(),
    );
    let bus = SPI_BUS.init(Mutex::new(RefCell::new(spi)));
    let radio_spi = SpiDeviceWithConfig::new(bus, Output::new(p.PIN_17, Level::High), radio_spi_config());

    let mut radio = Nrf24::new(radio_spi, Output::new(p.PIN_20, Level::Low), Delay);
    let config = RadioConfig::receiver().with_timing(RadioTiming {
        listen_ms: RECEIVER_LISTEN_MS,
        ..RadioTiming::default()
    });
    while let Err(e) = radio.init(&config) {
        error!("Radio init failed: {:?}, retrying", e);
        Timer::after_millis(500).await;
    }
    info!("Radio listening on channel {}", config.channel);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Rust Gamepad");
    usb_config.product = Some("PSX Radio Receiver");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 256]),
        CONTROL_BUF.init([0; 64]),
    );

    let hid_writer = configure_usb_hid(&mut builder, HID_STATE.init(State::new()));
    let mut usb_device = builder.build();
    let mut output = UsbHidOutput::new(hid_writer);

    let receive_loop = async {
        output.wait_ready().await;
        if let Err(e) = output.send_report(GamepadReport::neutral()).await {
            warn!("Initial report failed: {:?}", e);
        }
        info!("USB HID ready, forwarding frames...");

        loop {
            let mut payload = [0u8; FRAME_LEN];
            match radio.receive(&mut payload) {
                Ok(status) if status.data_ready() => match TelemetryFrame::from_bytes(&payload) {
                    Ok(frame) => {
                        debug!("Frame {:?}", frame);
                        if let Err(e) = output.send(&frame).await {
                            warn!("HID write failed: {:?}", e);
                        }
                    }
                    Err(e) => warn!("Bad frame: {:?}", e),
                },
                Ok(_) => {}
                Err(e) => error!("Receive failed: {:?}", e),
            }
            // Let the USB stack run between listen windows
            yield_now().await;
        }
    };

    join(usb_device.run(), receive_loop).await;
}
