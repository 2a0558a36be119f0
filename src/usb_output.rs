//! USB HID gamepad output for the receiving peer.

use defmt::Format;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::Builder;
use link_proto::TelemetryFrame;

/// USB HID Gamepad report structure.
///
/// This matches [`REPORT_DESCRIPTOR`].
/// Total size: 4 bytes (buttons: 2, left stick: 2x1)
///
/// The radio carries unsigned axes centred on 0x80; the report carries
/// them signed and centred on zero.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Format)]
#[repr(C)]
pub struct GamepadReport {
    /// Button bitfield, PSX bit layout (16 buttons)
    pub buttons: u16,
    /// Left stick X (-128 to 127)
    pub left_stick_x: i8,
    /// Left stick Y (-128 to 127)
    pub left_stick_y: i8,
}

impl GamepadReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 4;

    /// Convert the report to bytes.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let buttons_bytes = self.buttons.to_le_bytes();
        [
            buttons_bytes[0],
            buttons_bytes[1],
            self.left_stick_x as u8,
            self.left_stick_y as u8,
        ]
    }

    /// Nothing pressed, stick centred.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: 0,
            left_stick_x: 0,
            left_stick_y: 0,
        }
    }
}

impl From<&TelemetryFrame> for GamepadReport {
    fn from(frame: &TelemetryFrame) -> Self {
        Self {
            buttons: frame.buttons.raw(),
            left_stick_x: centre(frame.left_stick.x),
            left_stick_y: centre(frame.left_stick.y),
        }
    }
}

/// Shift an unsigned axis so 0x80 becomes 0.
const fn centre(axis: u8) -> i8 {
    (axis ^ 0x80) as i8
}

/// HID Gamepad Report Descriptor.
///
/// This descriptor defines a gamepad with:
/// - 16 buttons
/// - 1 analog stick (X/Y, signed 8-bit)
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (16 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x10, //   Report Count (16)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Left Stick ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x15, 0x80, //   Logical Minimum (-128)
    0x25, 0x7F, //   Logical Maximum (127)
    0x95, 0x02, //   Report Count (2)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

/// HID writer type for this board.
pub type GamepadWriter<'d> = HidWriter<'d, Driver<'d, USB>, { GamepadReport::SIZE }>;

/// USB HID gamepad output.
///
/// Wraps an embassy-usb HID writer to send gamepad reports.
pub struct UsbHidOutput<'d> {
    writer: GamepadWriter<'d>,
    last: Option<GamepadReport>,
}

impl<'d> UsbHidOutput<'d> {
    /// Create a new USB HID output from the given HID writer.
    pub fn new(writer: GamepadWriter<'d>) -> Self {
        Self { writer, last: None }
    }

    /// Wait until the device is ready (USB enumerated).
    pub async fn wait_ready(&mut self) {
        self.writer.ready().await;
    }

    /// Report the state carried by one received frame.
    pub async fn send(&mut self, frame: &TelemetryFrame) -> Result<(), EndpointError> {
        self.send_report(GamepadReport::from(frame)).await
    }

    /// Write a report. Identical consecutive reports are not re-sent.
    pub async fn send_report(&mut self, report: GamepadReport) -> Result<(), EndpointError> {
        if self.last == Some(report) {
            return Ok(());
        }
        self.writer.write(&report.as_bytes()).await?;
        self.last = Some(report);
        Ok(())
    }
}

/// Configure the USB HID class in the USB builder.
///
/// Returns the HID writer for use by the application.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
) -> GamepadWriter<'d> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: 1,
        max_packet_size: 8,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}
