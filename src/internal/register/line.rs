//! Line-interface registers (E1 framer / G.703 receiver).
//!
//! Error counters are latched once per second by writing [`LINE_LATCH`];
//! reading a latched counter returns the count for the elapsed second.

use super::{LINE_OFFSET, channel_base};

// =============================================================================
// Register Offsets (relative to the line block)
// =============================================================================

/// Line status register (u8)
pub const LINE_SR: u16 = 0x00;
/// Bipolar (code) violation counter (u16)
pub const LINE_BPV: u16 = 0x02;
/// CRC-4 error counter (u16, E1 only)
pub const LINE_CRC: u16 = 0x04;
/// Frame alignment (FAS) error counter (u16, E1 only)
pub const LINE_FAS: u16 = 0x06;
/// E-bit (remote CRC-4 error) counter (u16, E1 only)
pub const LINE_EBIT: u16 = 0x08;
/// Counter latch command register (u8)
pub const LINE_LATCH: u16 = 0x0A;

/// Value written to [`LINE_LATCH`] to snapshot and clear the counters
pub const LINE_LATCH_COUNTERS: u8 = 0x01;

// =============================================================================
// Line Status (LINE_SR) Bits
// =============================================================================

/// Loss of signal
pub const LINE_SR_LOS: u8 = 1 << 0;
/// Receive carrier loss
pub const LINE_SR_RCL: u8 = 1 << 1;
/// Alarm indication signal (receiving all ones)
pub const LINE_SR_AIS: u8 = 1 << 2;
/// Out of frame (frame alignment lost)
pub const LINE_SR_OOF: u8 = 1 << 3;
/// CRC-4 multiframe alignment lost
pub const LINE_SR_OOMF: u8 = 1 << 4;
/// Test code (loopback pattern) detected
pub const LINE_SR_TEST_CODE: u8 = 1 << 5;
/// Controlled slip occurred in the elastic store
pub const LINE_SR_SLIP: u8 = 1 << 6;

/// Absolute offset of a line-interface register
#[inline(always)]
pub const fn reg(channel: usize, offset: u16) -> u16 {
    channel_base(channel) + LINE_OFFSET + offset
}
