//! Recording test doubles for the SPI bus, GPIO lines and delays.
//!
//! Every double created from the same [`Timeline`] appends to one shared
//! event log, so tests can assert on the exact interleaving of chip-select
//! brackets, CE edges and waits.

extern crate std;

use crate::nrf24::{Command, Register, CLEAR_INTERRUPTS, R_REGISTER, W_REGISTER};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::vec::Vec;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// One byte slot or delay inside a chip-select bracket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exchange {
    Byte { sent: u8, received: u8 },
    Delay(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A complete transaction, select asserted at the start and released at the end.
    Transaction(Vec<Exchange>),
    Pin(&'static str, bool),
    /// Delay in nanoseconds.
    Delay(u64),
}

/// Shared event log.
#[derive(Clone, Default)]
pub struct Timeline {
    log: Shared<Vec<Event>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spi<R: Responder>(&self, responder: R) -> MockSpi<R> {
        MockSpi {
            log: self.log.clone(),
            responder,
        }
    }

    pub fn pin(&self, name: &'static str) -> MockPin {
        MockPin {
            name,
            log: self.log.clone(),
        }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay {
            log: self.log.clone(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    /// Contents of every transaction, in order.
    pub fn exchanges(&self) -> Vec<Vec<Exchange>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Transaction(exchanges) => Some(exchanges),
                _ => None,
            })
            .collect()
    }

    /// Bytes shifted out by every transaction, in order.
    pub fn transactions(&self) -> Vec<Vec<u8>> {
        self.exchanges()
            .into_iter()
            .map(|exchanges| {
                exchanges
                    .into_iter()
                    .filter_map(|exchange| match exchange {
                        Exchange::Byte { sent, .. } => Some(sent),
                        Exchange::Delay(_) => None,
                    })
                    .collect()
            })
            .collect()
    }

    /// Number of times the given pin was driven to `level`.
    pub fn edges(&self, name: &str, level: bool) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Event::Pin(n, l) if *n == name && *l == level))
            .count()
    }
}

/// Peripheral model behind a [`MockSpi`].
pub trait Responder {
    /// Chip-select asserted.
    fn begin(&mut self) {}
    /// Reply to the `index`th byte of the current transaction.
    fn byte(&mut self, index: usize, sent: u8) -> u8;
    /// Chip-select released.
    fn end(&mut self) {}
}

impl<R: Responder> Responder for Shared<R> {
    fn begin(&mut self) {
        self.lock().unwrap().begin();
    }

    fn byte(&mut self, index: usize, sent: u8) -> u8 {
        self.lock().unwrap().byte(index, sent)
    }

    fn end(&mut self) {
        self.lock().unwrap().end();
    }
}

/// Replies from a fixed queue, `0x00` once it runs dry.
pub struct ScriptedReplies {
    replies: VecDeque<u8>,
}

impl ScriptedReplies {
    pub fn new(replies: &[u8]) -> Self {
        Self {
            replies: replies.iter().copied().collect(),
        }
    }
}

impl Responder for ScriptedReplies {
    fn byte(&mut self, _index: usize, _sent: u8) -> u8 {
        self.replies.pop_front().unwrap_or(0x00)
    }
}

/// Register-level nRF24L01 model.
///
/// Replies STATUS to every instruction byte, keeps register contents,
/// clears STATUS flags written as 1 and records payloads written to the
/// TX FIFO.
pub struct RegisterFile {
    registers: [[u8; 5]; 0x18],
    status: u8,
    tx_fifo: Vec<Vec<u8>>,
    rx_payload: Vec<u8>,
    instruction: Option<u8>,
    status_writes: usize,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            registers: [[0; 5]; 0x18],
            // RX FIFO empty, no flags
            status: 0x0E,
            tx_fifo: Vec::new(),
            rx_payload: Vec::new(),
            instruction: None,
            status_writes: 0,
        }
    }

    pub fn get(&self, register: Register) -> u8 {
        self.registers[register as usize][0]
    }

    pub fn get_bytes(&self, register: Register) -> [u8; 5] {
        self.registers[register as usize]
    }

    pub fn set(&mut self, register: Register, bytes: &[u8]) {
        self.registers[register as usize][..bytes.len()].copy_from_slice(bytes);
    }

    /// Latch STATUS flags as the chip would after an event.
    pub fn raise(&mut self, flags: u8) {
        self.status |= flags;
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn set_rx_payload(&mut self, payload: &[u8]) {
        self.rx_payload = payload.to_vec();
    }

    /// Every payload byte currently queued for transmission.
    pub fn tx_fifo(&self) -> Vec<u8> {
        self.tx_fifo.concat()
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes
    }

    fn data_byte(&mut self, instruction: u8, offset: usize, sent: u8) -> u8 {
        if instruction == Command::ReadRxPayload as u8 {
            return self.rx_payload.get(offset).copied().unwrap_or(0x00);
        }
        if instruction == Command::WriteTxPayload as u8 {
            if let Some(entry) = self.tx_fifo.last_mut() {
                entry.push(sent);
            }
            return self.status;
        }

        let register = usize::from(instruction & 0x1F);
        if register >= self.registers.len() || offset >= 5 {
            return self.status;
        }

        match instruction & 0xE0 {
            W_REGISTER if register == Register::Status as usize => {
                self.status &= !(sent & CLEAR_INTERRUPTS);
                self.status_writes += 1;
                self.status
            }
            W_REGISTER => {
                self.registers[register][offset] = sent;
                self.status
            }
            R_REGISTER if register == Register::Status as usize => self.status,
            R_REGISTER => self.registers[register][offset],
            _ => self.status,
        }
    }
}

impl Responder for RegisterFile {
    fn begin(&mut self) {
        self.instruction = None;
    }

    fn byte(&mut self, index: usize, sent: u8) -> u8 {
        if index == 0 {
            self.instruction = Some(sent);
            if sent == Command::FlushTx as u8 {
                self.tx_fifo.clear();
            } else if sent == Command::WriteTxPayload as u8 {
                self.tx_fifo.push(Vec::new());
            }
            return self.status;
        }
        match self.instruction {
            Some(instruction) => self.data_byte(instruction, index - 1, sent),
            None => self.status,
        }
    }
}

/// Recording [`SpiDevice`]; one [`Event::Transaction`] per call.
pub struct MockSpi<R> {
    log: Shared<Vec<Event>>,
    responder: R,
}

impl<R> spi::ErrorType for MockSpi<R> {
    type Error = Infallible;
}

impl<R: Responder> SpiDevice for MockSpi<R> {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut exchanges = Vec::new();
        let mut index = 0;
        let mut shift = |responder: &mut R, sent: u8, exchanges: &mut Vec<Exchange>| {
            let received = responder.byte(index, sent);
            index += 1;
            exchanges.push(Exchange::Byte { sent, received });
            received
        };

        self.responder.begin();
        for operation in operations.iter_mut() {
            match operation {
                Operation::TransferInPlace(bytes) => {
                    for byte in bytes.iter_mut() {
                        *byte = shift(&mut self.responder, *byte, &mut exchanges);
                    }
                }
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        shift(&mut self.responder, byte, &mut exchanges);
                    }
                }
                Operation::Read(bytes) => {
                    for byte in bytes.iter_mut() {
                        *byte = shift(&mut self.responder, 0x00, &mut exchanges);
                    }
                }
                Operation::Transfer(read, write) => {
                    for i in 0..read.len().max(write.len()) {
                        let sent = write.get(i).copied().unwrap_or(0x00);
                        let received = shift(&mut self.responder, sent, &mut exchanges);
                        if let Some(slot) = read.get_mut(i) {
                            *slot = received;
                        }
                    }
                }
                Operation::DelayNs(ns) => exchanges.push(Exchange::Delay(*ns)),
            }
        }
        self.responder.end();

        self.log.lock().unwrap().push(Event::Transaction(exchanges));
        Ok(())
    }
}

/// Recording output line.
pub struct MockPin {
    name: &'static str,
    log: Shared<Vec<Event>>,
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.lock().unwrap().push(Event::Pin(self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.lock().unwrap().push(Event::Pin(self.name, true));
        Ok(())
    }
}

/// Recording delay; returns immediately.
pub struct MockDelay {
    log: Shared<Vec<Event>>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.lock().unwrap().push(Event::Delay(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.log
            .lock()
            .unwrap()
            .push(Event::Delay(u64::from(us) * 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log
            .lock()
            .unwrap()
            .push(Event::Delay(u64::from(ms) * 1_000_000));
    }
}
