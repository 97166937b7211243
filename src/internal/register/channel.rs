//! Channel control registers: interrupt status, mode and modem status.

use super::channel_base;

// =============================================================================
// Register Offsets (relative to the channel block)
// =============================================================================

/// Channel interrupt status register (u8, write-1-to-clear)
pub const CHAN_ISR: u16 = 0x00;
/// Channel mode register (u8)
pub const CHAN_MODE: u16 = 0x01;
/// Modem status register (u8, live signal levels)
pub const MODEM_STATUS: u16 = 0x02;

// =============================================================================
// Channel Interrupt Status (CHAN_ISR) Bits
// =============================================================================

/// Receive DMA event (descriptor completion or DMA error)
pub const CHAN_ISR_RX_DMA: u8 = 1 << 0;
/// Transmit DMA event (descriptor completion or chain overflow)
pub const CHAN_ISR_TX_DMA: u8 = 1 << 1;
/// Modem signal change (carrier or CTS)
pub const CHAN_ISR_MODEM: u8 = 1 << 2;

// =============================================================================
// Channel Mode (CHAN_MODE) Values
// =============================================================================

/// Asynchronous framing
pub const MODE_ASYNC: u8 = 0x00;
/// HDLC framing
pub const MODE_HDLC: u8 = 0x01;
/// HDLC over a framed E1 line interface
pub const MODE_E1: u8 = 0x02;
/// HDLC over an unframed G.703 line interface
pub const MODE_G703: u8 = 0x03;
/// CRC-4 multiframe enable (E1 only)
pub const MODE_CRC4: u8 = 1 << 4;

// =============================================================================
// Modem Status (MODEM_STATUS) Bits
// =============================================================================

/// Data Carrier Detect asserted
pub const MODEM_CD: u8 = 1 << 0;
/// Clear To Send asserted
pub const MODEM_CTS: u8 = 1 << 1;

/// Absolute offset of a channel control register
#[inline(always)]
pub const fn reg(channel: usize, offset: u16) -> u16 {
    channel_base(channel) + offset
}
