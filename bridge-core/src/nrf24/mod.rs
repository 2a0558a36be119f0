//! nRF24L01(+) driver: register access, one-time setup, transmit, receive.
//!
//! The driver owns the chip's SPI device (and with it the CSN line) and the
//! CE line. Every register or payload operation is exactly one SPI
//! transaction, so CSN is held low only for the duration of that operation
//! and released on every exit path.
//!
//! Delivery failure is not reported by [`Nrf24::transmit`]. Callers sample
//! [`Nrf24::status`] afterwards, test [`Status::max_retries`], and clear the
//! flag with [`Nrf24::reset_status`] before sending again.

mod config;
mod registers;

pub use config::{ConfigError, DataRate, PowerLevel, RadioConfig, RadioTiming, Role, MAX_CHANNEL};
pub use registers::{
    Command, ObserveTx, Register, Status, TransmissionOutcome, CLEAR_INTERRUPTS, MAX_PAYLOAD,
    R_REGISTER, W_REGISTER,
};

use crate::bus::{exchange_spaced, MAX_EXCHANGE};
use crate::output::{RadioError, TelemetrySink};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use link_proto::TelemetryFrame;

/// Direction of a register transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    Read,
    Write,
}

/// Data phase of a transaction.
enum DataPhase<'a> {
    /// Bytes shifted out after the instruction; replies discarded.
    Out(&'a [u8]),
    /// NOP fillers shifted out; replies captured.
    In(&'a mut [u8]),
}

/// nRF24L01 driver handle.
pub struct Nrf24<SPI, CE, D> {
    spi: SPI,
    ce: CE,
    delay: D,
    timing: RadioTiming,
    role: Option<Role>,
    payload_width: u8,
}

impl<SPI, CE, D> Nrf24<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    /// Wrap the chip's SPI device, CE line and a delay source.
    ///
    /// Nothing is sent until [`init`](Self::init).
    pub fn new(spi: SPI, ce: CE, delay: D) -> Self {
        Self {
            spi,
            ce,
            delay,
            timing: RadioTiming::default(),
            role: None,
            payload_width: link_proto::PAYLOAD_WIDTH,
        }
    }

    /// Write the configuration, one register per transaction, in the order
    /// the chip expects, then wait for it to power up.
    ///
    /// The configuration is validated before the bus is touched.
    pub fn init(&mut self, config: &RadioConfig) -> Result<(), RadioError> {
        config.validate()?;
        self.timing = config.timing;
        self.ce.set_low().map_err(|_| RadioError::Pin)?;

        self.write_register(Register::EnAa, config.en_aa())?;
        self.write_register(Register::SetupRetr, config.setup_retr())?;
        self.write_register(Register::EnRxAddr, config.en_rxaddr())?;
        self.write_register(Register::SetupAw, config.setup_aw())?;
        self.write_register(Register::RfCh, config.channel)?;
        self.write_register(Register::RfSetup, config.rf_setup())?;
        self.write_bytes(Register::RxAddrP0, config.rx_address_bytes())?;
        self.write_bytes(Register::TxAddr, config.tx_address_bytes())?;
        self.write_register(Register::RxPwP0, config.payload_width)?;
        self.write_register(Register::Config, config.config_register())?;

        self.delay.delay_ms(self.timing.power_up_ms);

        self.role = Some(config.role);
        self.payload_width = config.payload_width;

        #[cfg(feature = "defmt")]
        defmt::debug!("nRF24 configured as {:?} on channel {}", config.role, config.channel);

        Ok(())
    }

    /// Register transfer primitive.
    ///
    /// Sends the read or write instruction for `register`, then either the
    /// contents of `buffer` (write) or NOP fillers whose replies are stored
    /// back into `buffer` (read).
    pub fn transfer(
        &mut self,
        access: Access,
        register: Register,
        buffer: &mut [u8],
    ) -> Result<(), RadioError> {
        match access {
            Access::Read => self.exchange(R_REGISTER | register.addr(), DataPhase::In(buffer)),
            Access::Write => self.exchange(W_REGISTER | register.addr(), DataPhase::Out(buffer)),
        }
    }

    /// Read a single-byte register.
    pub fn read_register(&mut self, register: Register) -> Result<u8, RadioError> {
        let mut value = [0u8; 1];
        self.transfer(Access::Read, register, &mut value)?;
        Ok(value[0])
    }

    /// Write a single-byte register.
    pub fn write_register(&mut self, register: Register, value: u8) -> Result<(), RadioError> {
        self.write_bytes(register, &[value])
    }

    fn write_bytes(&mut self, register: Register, bytes: &[u8]) -> Result<(), RadioError> {
        self.exchange(W_REGISTER | register.addr(), DataPhase::Out(bytes))
    }

    /// Sample the STATUS register.
    pub fn status(&mut self) -> Result<Status, RadioError> {
        self.read_register(Register::Status).map(Status)
    }

    /// Clear RX_DR, TX_DS and MAX_RT. Leaves the configuration untouched.
    pub fn reset_status(&mut self) -> Result<(), RadioError> {
        self.write_register(Register::Status, CLEAR_INTERRUPTS)
    }

    /// Sample the OBSERVE_TX retransmission counters.
    pub fn observe_tx(&mut self) -> Result<ObserveTx, RadioError> {
        self.read_register(Register::ObserveTx).map(ObserveTx)
    }

    /// Drop anything still queued in the TX FIFO.
    pub fn flush_tx(&mut self) -> Result<(), RadioError> {
        self.exchange(Command::FlushTx as u8, DataPhase::Out(&[]))
    }

    /// Send one payload.
    ///
    /// Flushes stale TX content, loads `payload`, then pulses CE to start
    /// the transmission. The outcome has to be read from [`status`](Self::status).
    pub fn transmit(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        self.require_role(Role::Transmitter)?;
        if payload.len() > MAX_PAYLOAD {
            return Err(RadioError::PayloadLength);
        }

        self.flush_tx()?;
        self.exchange(Command::WriteTxPayload as u8, DataPhase::Out(payload))?;
        self.delay.delay_ms(self.timing.payload_settle_ms);

        self.ce.set_high().map_err(|_| RadioError::Pin)?;
        self.delay.delay_us(self.timing.ce_pulse_us);
        self.ce.set_low().map_err(|_| RadioError::Pin)?;

        self.delay.delay_ms(self.timing.post_transmit_ms);
        Ok(())
    }

    /// Listen for one fixed window, then read a payload into `buffer`.
    ///
    /// Returns the status sampled before the payload was read; the payload
    /// is only fresh when [`Status::data_ready`] is set. The interrupt flags
    /// are cleared afterwards either way.
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<Status, RadioError> {
        self.require_role(Role::Receiver)?;

        self.ce.set_high().map_err(|_| RadioError::Pin)?;
        self.delay.delay_ms(self.timing.listen_ms);
        self.ce.set_low().map_err(|_| RadioError::Pin)?;

        let status = self.status()?;
        let width = usize::from(self.payload_width).min(buffer.len());
        self.exchange(
            Command::ReadRxPayload as u8,
            DataPhase::In(&mut buffer[..width]),
        )?;
        self.reset_status()?;

        Ok(status)
    }

    /// Role set by the last successful [`init`](Self::init).
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Give back the SPI device, CE line and delay.
    pub fn release(self) -> (SPI, CE, D) {
        (self.spi, self.ce, self.delay)
    }

    fn require_role(&self, role: Role) -> Result<(), RadioError> {
        match self.role {
            None => Err(RadioError::NotInitialized),
            Some(current) if current == role => Ok(()),
            Some(_) => Err(RadioError::WrongRole),
        }
    }

    /// One bracketed transaction: instruction byte, then the data phase.
    fn exchange(&mut self, instruction: u8, data: DataPhase<'_>) -> Result<(), RadioError> {
        let len = match &data {
            DataPhase::Out(bytes) => bytes.len(),
            DataPhase::In(bytes) => bytes.len(),
        };
        if len > MAX_PAYLOAD {
            return Err(RadioError::PayloadLength);
        }

        let mut frame = [Command::Nop as u8; MAX_EXCHANGE];
        frame[0] = instruction;
        if let DataPhase::Out(bytes) = &data {
            frame[1..=len].copy_from_slice(bytes);
        }

        let settle_ns = self.timing.settle_us.saturating_mul(1_000);
        self.delay.delay_us(self.timing.settle_us);
        exchange_spaced(&mut self.spi, &mut frame[..=len], settle_ns, settle_ns)?;

        if let DataPhase::In(bytes) = data {
            bytes.copy_from_slice(&frame[1..=len]);
        }
        Ok(())
    }
}

impl<SPI, CE, D> TelemetrySink for Nrf24<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    fn send_frame(&mut self, frame: &TelemetryFrame) -> Result<(), RadioError> {
        self.transmit(&frame.to_bytes())
    }

    fn transmission_status(&mut self) -> Result<Status, RadioError> {
        self.status()
    }

    fn clear_fault(&mut self) -> Result<(), RadioError> {
        self.reset_status()
    }

    fn retransmit_stats(&mut self) -> Result<ObserveTx, RadioError> {
        self.observe_tx()
    }
}
