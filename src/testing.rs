//! Testing utilities and mock implementations
//!
//! Host-side doubles for the adapter's register space, the reset delay and
//! the event sink.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use crate::driver::config::Direction;
use crate::driver::error::ChannelError;
use crate::driver::events::{EventSink, FrameTag};
use crate::hal::{ModemSignals, RegisterSpace};
use crate::internal::register::channel::{self, CHAN_ISR, MODEM_CD, MODEM_CTS, MODEM_STATUS};
use crate::internal::register::dma::{CDA, DSR, block_base};
use crate::internal::register::line::{self, LINE_BPV, LINE_CRC, LINE_EBIT, LINE_FAS, LINE_SR};
use crate::internal::register::BOARD_ISR;

// =============================================================================
// Mock Register Space
// =============================================================================

#[derive(Debug, Default)]
struct MockState {
    /// Byte-addressed register contents, words little-endian
    bytes: HashMap<u16, u8>,
    /// Record of writes: (offset, value)
    write_log: Vec<(u16, u16)>,
    /// Byte registers where writing a 1 clears the bit
    write_one_to_clear: HashSet<u16>,
    /// Word registers that read back as zero after a read
    clear_on_read: HashSet<u16>,
}

impl MockState {
    fn byte(&self, offset: u16) -> u8 {
        self.bytes.get(&offset).copied().unwrap_or(0)
    }

    fn word(&self, offset: u16) -> u16 {
        u16::from(self.byte(offset)) | (u16::from(self.byte(offset.wrapping_add(1))) << 8)
    }

    fn set_word(&mut self, offset: u16, value: u16) {
        self.bytes.insert(offset, value as u8);
        self.bytes.insert(offset.wrapping_add(1), (value >> 8) as u8);
    }
}

/// Mock register space for testing the board without hardware
///
/// Clones share the same registers, so a test can keep one handle for
/// playing the controller while the board owns another.
///
/// # Example
///
/// ```ignore
/// let hw = MockRegisterSpace::for_board(2);
/// let mut board: Board<_, 2, 4, 512> = Board::new(hw.clone());
///
/// hw.set_modem(0, true, true);
/// hw.raise_channel_interrupt(0, CHAN_ISR_MODEM);
/// board.handle_interrupt(&mut sink);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRegisterSpace {
    state: Arc<Mutex<MockState>>,
}

impl MockRegisterSpace {
    /// Plain memory: every register reads back what was written
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers of a board with `channels` channels: interrupt and DMA
    /// status registers are write-1-to-clear, line error counters clear on
    /// read.
    pub fn for_board(channels: usize) -> Self {
        let mock = Self::new();
        {
            let mut state = mock.state();
            state.write_one_to_clear.insert(BOARD_ISR);
            for ch in 0..channels {
                state.write_one_to_clear.insert(channel::reg(ch, CHAN_ISR));
                for direction in [Direction::Receive, Direction::Transmit] {
                    state.write_one_to_clear.insert(block_base(ch, direction) + DSR);
                }
                for counter in [LINE_BPV, LINE_CRC, LINE_FAS, LINE_EBIT] {
                    state.clear_on_read.insert(line::reg(ch, counter));
                }
            }
        }
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Current value of a byte register, without side effects
    pub fn peek_u8(&self, offset: u16) -> u8 {
        self.state().byte(offset)
    }

    /// Current value of a word register, without side effects
    pub fn peek_u16(&self, offset: u16) -> u16 {
        self.state().word(offset)
    }

    /// Current value of a split 32-bit register, without side effects
    pub fn peek_u32(&self, offset: u16) -> u32 {
        let state = self.state();
        u32::from(state.word(offset)) | (u32::from(state.word(offset + 2)) << 16)
    }

    /// Get all writes that have been made
    pub fn writes(&self) -> Vec<(u16, u16)> {
        self.state().write_log.clone()
    }

    /// Clear the write log
    pub fn clear_writes(&self) {
        self.state().write_log.clear();
    }

    /// Drive the modem status inputs of a channel
    pub fn set_modem(&self, ch: usize, carrier: bool, cts: bool) {
        let mut value = 0;
        if carrier {
            value |= MODEM_CD;
        }
        if cts {
            value |= MODEM_CTS;
        }
        self.state().bytes.insert(channel::reg(ch, MODEM_STATUS), value);
    }

    /// Set the line status (alarm) register of a channel
    pub fn set_line_status(&self, ch: usize, status: u8) {
        self.state().bytes.insert(line::reg(ch, LINE_SR), status);
    }

    /// Load the error counters of a channel's line interface
    pub fn set_line_counters(&self, ch: usize, bpv: u16, crc: u16, fas: u16, ebit: u16) {
        let mut state = self.state();
        state.set_word(line::reg(ch, LINE_BPV), bpv);
        state.set_word(line::reg(ch, LINE_CRC), crc);
        state.set_word(line::reg(ch, LINE_FAS), fas);
        state.set_word(line::reg(ch, LINE_EBIT), ebit);
    }

    /// Move a DMA controller's current descriptor pointer
    pub fn set_current_descriptor(&self, ch: usize, direction: Direction, addr: u32) {
        let offset = block_base(ch, direction) + CDA;
        let mut state = self.state();
        state.set_word(offset, addr as u16);
        state.set_word(offset + 2, (addr >> 16) as u16);
    }

    /// Current descriptor pointer of a DMA controller
    pub fn current_descriptor(&self, ch: usize, direction: Direction) -> u32 {
        self.peek_u32(block_base(ch, direction) + CDA)
    }

    /// Set a DMA controller's status register
    pub fn set_dma_status(&self, ch: usize, direction: Direction, status: u8) {
        self.state()
            .bytes
            .insert(block_base(ch, direction) + DSR, status);
    }

    /// Raise channel interrupt bits and flag the channel in the board
    /// summary
    pub fn raise_channel_interrupt(&self, ch: usize, bits: u8) {
        let mut state = self.state();
        let isr = channel::reg(ch, CHAN_ISR);
        let value = state.byte(isr) | bits;
        state.bytes.insert(isr, value);
        let summary = state.byte(BOARD_ISR) | (1 << ch);
        state.bytes.insert(BOARD_ISR, summary);
    }
}

impl RegisterSpace for MockRegisterSpace {
    fn read_u8(&mut self, offset: u16) -> u8 {
        self.state().byte(offset)
    }

    fn write_u8(&mut self, offset: u16, value: u8) {
        let mut state = self.state();
        state.write_log.push((offset, u16::from(value)));
        let stored = if state.write_one_to_clear.contains(&offset) {
            state.byte(offset) & !value
        } else {
            value
        };
        state.bytes.insert(offset, stored);
    }

    fn read_u16(&mut self, offset: u16) -> u16 {
        let mut state = self.state();
        let value = state.word(offset);
        if state.clear_on_read.contains(&offset) {
            state.set_word(offset, 0);
        }
        value
    }

    fn write_u16(&mut self, offset: u16, value: u16) {
        let mut state = self.state();
        state.write_log.push((offset, value));
        state.set_word(offset, value);
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay implementation for testing
///
/// Records the total delay time without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

// =============================================================================
// Recording Sink
// =============================================================================

/// One delivered event, payloads copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Received(usize, Vec<u8>),
    TransmitDone(usize, FrameTag, usize),
    Error(usize, ChannelError),
    Modem(usize, ModemSignals),
}

/// Event sink that records everything it is given, in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn frame_received(&mut self, channel: usize, data: &[u8]) {
        self.events.push(Event::Received(channel, data.to_vec()));
    }

    fn transmit_done(&mut self, channel: usize, tag: FrameTag, len: usize) {
        self.events.push(Event::TransmitDone(channel, tag, len));
    }

    fn channel_error(&mut self, channel: usize, error: ChannelError) {
        self.events.push(Event::Error(channel, error));
    }

    fn modem_changed(&mut self, channel: usize, signals: ModemSignals) {
        self.events.push(Event::Modem(channel, signals));
    }
}
