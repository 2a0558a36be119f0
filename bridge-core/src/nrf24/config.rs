//! One-time radio configuration and protocol timing.

use super::registers::{CRCO, EN_CRC, MASK_MAX_RT, MASK_RX_DR, MASK_TX_DS, PRIM_RX, PWR_UP};
use super::registers::MAX_PAYLOAD;
use link_proto::{LINK_ADDRESS, LINK_CHANNEL, PAYLOAD_WIDTH};

/// Highest RF channel the chip accepts (2.525GHz).
pub const MAX_CHANNEL: u8 = 125;

/// Whether the chip acts as primary transmitter or primary receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    Transmitter,
    Receiver,
}

/// Air data rate (RF_DR bit).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    /// Longer range.
    Mbps1,
    Mbps2,
}

/// Transmit output power (RF_PWR bits).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerLevel {
    Minus18dBm = 0b00,
    Minus12dBm = 0b01,
    Minus6dBm = 0b10,
    ZeroDbm = 0b11,
}

/// Out-of-range configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// More than 15 automatic retransmissions.
    RetryCount,
    /// Retry delay outside 250-4000µs or not a multiple of 250µs.
    RetryDelay,
    /// Channel above [`MAX_CHANNEL`].
    Channel,
    /// Address width outside 3-5 bytes.
    AddressWidth,
    /// Payload width outside 1-32 bytes.
    PayloadWidth,
}

/// Fixed waits around each protocol step.
///
/// These are minimum bounds imposed by the chip; they can be raised but
/// lowering them below the datasheet figures is not safe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioTiming {
    /// Before every transaction and after every byte inside it.
    pub settle_us: u32,
    /// After the payload is loaded, before CE is raised.
    pub payload_settle_ms: u32,
    /// Length of the CE pulse that starts a transmission.
    pub ce_pulse_us: u32,
    /// After a transmission before the next one may start.
    pub post_transmit_ms: u32,
    /// After CONFIG is written, before the chip is used.
    pub power_up_ms: u32,
    /// How long CE stays high while receiving.
    pub listen_ms: u32,
}

impl Default for RadioTiming {
    fn default() -> Self {
        Self {
            settle_us: 10,
            payload_settle_ms: 10,
            ce_pulse_us: 20,
            post_transmit_ms: 10,
            power_up_ms: 100,
            listen_ms: 1000,
        }
    }
}

/// Values written once during [`Nrf24::init`](super::Nrf24::init).
///
/// Address, channel and payload width must be identical on both peers.
/// The defaults come from [`link_proto`] so a transmitter and receiver built
/// from this workspace always agree.
///
/// # Example
///
/// ```
/// use bridge_core::nrf24::{RadioConfig, Role};
///
/// let config = RadioConfig::receiver().with_channel(76);
/// assert_eq!(config.role, Role::Receiver);
/// assert_eq!(config.config_register(), 0x7F);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    pub role: Role,
    /// Auto-acknowledge on pipe 0.
    pub auto_ack: bool,
    /// Automatic retransmissions, 0-15.
    pub retry_count: u8,
    /// Wait between retransmissions, 250-4000µs in 250µs steps.
    pub retry_delay_us: u16,
    /// Address width in bytes, 3-5.
    pub address_width: u8,
    pub channel: u8,
    pub data_rate: DataRate,
    pub power: PowerLevel,
    /// Low-noise amplifier gain (LNA_HCURR).
    pub lna_gain: bool,
    pub rx_address: [u8; 5],
    pub tx_address: [u8; 5],
    /// Static payload width in bytes, 1-32.
    pub payload_width: u8,
    pub timing: RadioTiming,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self::transmitter()
    }
}

impl RadioConfig {
    /// Link defaults in the primary transmitter role.
    #[must_use]
    pub fn transmitter() -> Self {
        Self {
            role: Role::Transmitter,
            auto_ack: true,
            retry_count: 15,
            retry_delay_us: 750,
            address_width: 5,
            channel: LINK_CHANNEL,
            data_rate: DataRate::Mbps1,
            power: PowerLevel::ZeroDbm,
            lna_gain: true,
            rx_address: LINK_ADDRESS,
            tx_address: LINK_ADDRESS,
            payload_width: PAYLOAD_WIDTH,
            timing: RadioTiming::default(),
        }
    }

    /// Link defaults in the primary receiver role.
    #[must_use]
    pub fn receiver() -> Self {
        Self {
            role: Role::Receiver,
            ..Self::transmitter()
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    #[must_use]
    pub fn with_addresses(mut self, rx_address: [u8; 5], tx_address: [u8; 5]) -> Self {
        self.rx_address = rx_address;
        self.tx_address = tx_address;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, count: u8, delay_us: u16) -> Self {
        self.retry_count = count;
        self.retry_delay_us = delay_us;
        self
    }

    #[must_use]
    pub fn with_payload_width(mut self, width: u8) -> Self {
        self.payload_width = width;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: RadioTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Check every field against the chip's accepted ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_count > 15 {
            return Err(ConfigError::RetryCount);
        }
        if !(250..=4000).contains(&self.retry_delay_us) || self.retry_delay_us % 250 != 0 {
            return Err(ConfigError::RetryDelay);
        }
        if self.channel > MAX_CHANNEL {
            return Err(ConfigError::Channel);
        }
        if !(3..=5).contains(&self.address_width) {
            return Err(ConfigError::AddressWidth);
        }
        if self.payload_width == 0 || usize::from(self.payload_width) > MAX_PAYLOAD {
            return Err(ConfigError::PayloadWidth);
        }
        Ok(())
    }

    /// EN_AA value.
    #[must_use]
    pub fn en_aa(&self) -> u8 {
        u8::from(self.auto_ack)
    }

    /// EN_RXADDR value: pipe 0 only.
    #[must_use]
    pub fn en_rxaddr(&self) -> u8 {
        0x01
    }

    /// SETUP_RETR value: delay code in the high nibble, count in the low one.
    #[must_use]
    pub fn setup_retr(&self) -> u8 {
        let delay_code = (self.retry_delay_us / 250).saturating_sub(1) as u8;
        (delay_code << 4) | (self.retry_count & 0x0F)
    }

    /// SETUP_AW value: 0b01 for 3 bytes up to 0b11 for 5 bytes.
    #[must_use]
    pub fn setup_aw(&self) -> u8 {
        self.address_width.saturating_sub(2) & 0b11
    }

    /// RF_SETUP value.
    #[must_use]
    pub fn rf_setup(&self) -> u8 {
        let rate = match self.data_rate {
            DataRate::Mbps1 => 0,
            DataRate::Mbps2 => 1 << 3,
        };
        rate | ((self.power as u8) << 1) | u8::from(self.lna_gain)
    }

    /// CONFIG value: all interrupts masked, 2-byte CRC, powered up, role bit.
    #[must_use]
    pub fn config_register(&self) -> u8 {
        let base = MASK_RX_DR | MASK_TX_DS | MASK_MAX_RT | EN_CRC | CRCO | PWR_UP;
        match self.role {
            Role::Transmitter => base,
            Role::Receiver => base | PRIM_RX,
        }
    }

    /// The configured bytes of the receive address.
    #[must_use]
    pub fn rx_address_bytes(&self) -> &[u8] {
        &self.rx_address[..usize::from(self.address_width.min(5))]
    }

    /// The configured bytes of the transmit address.
    #[must_use]
    pub fn tx_address_bytes(&self) -> &[u8] {
        &self.tx_address[..usize::from(self.address_width.min(5))]
    }
}
