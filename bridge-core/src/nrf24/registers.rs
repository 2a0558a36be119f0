//! nRF24L01 register map, instruction set and status decoding.

/// Read-register instruction, ORed with the register address.
pub const R_REGISTER: u8 = 0x00;
/// Write-register instruction, ORed with the register address.
pub const W_REGISTER: u8 = 0x20;
/// Bits of an instruction byte that carry the register address.
pub const REGISTER_MASK: u8 = 0x1F;

/// Largest payload the chip's FIFOs hold.
pub const MAX_PAYLOAD: usize = 32;

/// Configuration and status registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Config = 0x00,
    EnAa = 0x01,
    EnRxAddr = 0x02,
    SetupAw = 0x03,
    SetupRetr = 0x04,
    RfCh = 0x05,
    RfSetup = 0x06,
    Status = 0x07,
    ObserveTx = 0x08,
    /// Carrier detect (received power detector on the + variant).
    Cd = 0x09,
    RxAddrP0 = 0x0A,
    RxAddrP1 = 0x0B,
    RxAddrP2 = 0x0C,
    RxAddrP3 = 0x0D,
    RxAddrP4 = 0x0E,
    RxAddrP5 = 0x0F,
    TxAddr = 0x10,
    RxPwP0 = 0x11,
    RxPwP1 = 0x12,
    RxPwP2 = 0x13,
    RxPwP3 = 0x14,
    RxPwP4 = 0x15,
    RxPwP5 = 0x16,
    FifoStatus = 0x17,
}

impl Register {
    /// Register address as sent in the instruction byte.
    #[inline]
    #[must_use]
    pub const fn addr(self) -> u8 {
        self as u8 & REGISTER_MASK
    }
}

/// Instructions that do not address a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    ReadRxPayload = 0x61,
    WriteTxPayload = 0xA0,
    FlushTx = 0xE1,
    FlushRx = 0xE2,
    ReuseTxPayload = 0xE3,
    Nop = 0xFF,
}

// CONFIG bits
pub const MASK_RX_DR: u8 = 1 << 6;
pub const MASK_TX_DS: u8 = 1 << 5;
pub const MASK_MAX_RT: u8 = 1 << 4;
pub const EN_CRC: u8 = 1 << 3;
pub const CRCO: u8 = 1 << 2;
pub const PWR_UP: u8 = 1 << 1;
pub const PRIM_RX: u8 = 1 << 0;

// STATUS bits
pub const RX_DR: u8 = 1 << 6;
pub const TX_DS: u8 = 1 << 5;
pub const MAX_RT: u8 = 1 << 4;
pub const TX_FULL: u8 = 1 << 0;
const RX_P_NO_SHIFT: u8 = 1;
const RX_P_NO_MASK: u8 = 0b111;

/// Writing this to STATUS clears all three interrupt flags.
pub const CLEAR_INTERRUPTS: u8 = RX_DR | TX_DS | MAX_RT;

/// Result of a single send attempt as seen in one STATUS sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmissionOutcome {
    /// The receiver acknowledged the payload.
    Success,
    /// Every configured retry went unacknowledged.
    MaxRetriesExceeded,
    /// Neither flag was set when the status was sampled.
    Pending,
}

/// Snapshot of the STATUS register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u8);

impl Status {
    #[inline]
    #[must_use]
    pub const fn max_retries(self) -> bool {
        self.0 & MAX_RT != 0
    }

    #[inline]
    #[must_use]
    pub const fn data_sent(self) -> bool {
        self.0 & TX_DS != 0
    }

    #[inline]
    #[must_use]
    pub const fn data_ready(self) -> bool {
        self.0 & RX_DR != 0
    }

    #[inline]
    #[must_use]
    pub const fn tx_full(self) -> bool {
        self.0 & TX_FULL != 0
    }

    /// Pipe holding the next RX payload, `None` when the RX FIFO is empty.
    #[inline]
    #[must_use]
    pub const fn rx_pipe(self) -> Option<u8> {
        match (self.0 >> RX_P_NO_SHIFT) & RX_P_NO_MASK {
            pipe @ 0..=5 => Some(pipe),
            _ => None,
        }
    }

    /// Classify the last send attempt.
    ///
    /// MAX_RT wins over TX_DS if a stale flag left both set.
    #[must_use]
    pub const fn outcome(self) -> TransmissionOutcome {
        if self.max_retries() {
            TransmissionOutcome::MaxRetriesExceeded
        } else if self.data_sent() {
            TransmissionOutcome::Success
        } else {
            TransmissionOutcome::Pending
        }
    }
}

/// Snapshot of the OBSERVE_TX register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObserveTx(pub u8);

impl ObserveTx {
    /// Packets lost since the channel was last written, saturates at 15.
    #[inline]
    #[must_use]
    pub const fn lost_packets(self) -> u8 {
        self.0 >> 4
    }

    /// Retransmissions spent on the current payload.
    #[inline]
    #[must_use]
    pub const fn retries(self) -> u8 {
        self.0 & 0x0F
    }
}
