//! Register map of the adapter.
//!
//! All offsets are relative to the start of the board's register space and
//! are accessed through [`RegisterSpace`](crate::hal::RegisterSpace).
//!
//! ```text
//! 0x0000  board block   (interrupt summary, reset)
//! 0x0100  channel 0     (see channel layout below)
//! 0x0200  channel 1
//! ...
//!
//! channel + 0x00  interrupt status / mode / modem status
//! channel + 0x10  receive DMA block
//! channel + 0x20  transmit DMA block
//! channel + 0x40  line interface (E1 / G.703 only)
//! ```

pub mod channel;
pub mod dma;
pub mod line;

// =============================================================================
// Board Block
// =============================================================================

/// Board interrupt summary register (u8, one bit per channel, write-1-to-clear)
pub const BOARD_ISR: u16 = 0x00;

/// Board reset register (u8)
pub const BOARD_RESET: u16 = 0x01;

/// Value written to [`BOARD_RESET`] to hold the DMA controllers in reset
pub const BOARD_RESET_ASSERT: u8 = 0x01;

// =============================================================================
// Channel Blocks
// =============================================================================

/// Offset of channel 0's register block
pub const CHANNEL_BASE: u16 = 0x100;

/// Stride between consecutive channel register blocks
pub const CHANNEL_STRIDE: u16 = 0x100;

/// Receive DMA block offset within a channel block
pub const RX_DMA_OFFSET: u16 = 0x10;

/// Transmit DMA block offset within a channel block
pub const TX_DMA_OFFSET: u16 = 0x20;

/// Line-interface block offset within a channel block
pub const LINE_OFFSET: u16 = 0x40;

/// Base offset of a channel's register block
#[inline(always)]
pub const fn channel_base(channel: usize) -> u16 {
    CHANNEL_BASE + (channel as u16) * CHANNEL_STRIDE
}
