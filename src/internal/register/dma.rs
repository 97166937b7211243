//! DMA controller registers.
//!
//! Each channel has one receive and one transmit DMA block with identical
//! layout. The controller walks a chain of descriptors starting at the
//! current descriptor address (CDA) and stops when it reaches the end
//! descriptor address (EDA); moving EDA forward hands more descriptors to the
//! hardware.

use bitflags::bitflags;

use super::{RX_DMA_OFFSET, TX_DMA_OFFSET, channel_base};
use crate::driver::config::Direction;
use crate::hal::RegisterSpace;

// =============================================================================
// Register Offsets (relative to the DMA block)
// =============================================================================

/// Current descriptor address (u32 across two words)
pub const CDA: u16 = 0x00;
/// End descriptor address (u32 across two words)
pub const EDA: u16 = 0x04;
/// Receive buffer length (u16)
pub const BFL: u16 = 0x08;
/// DMA status register (u8, write-1-to-clear for event bits)
pub const DSR: u16 = 0x0A;
/// DMA command register (u8)
pub const DCR: u16 = 0x0B;
/// DMA interrupt enable register (u8)
pub const DIR: u16 = 0x0C;

// =============================================================================
// DMA Status Register (DSR) Bits
// =============================================================================

/// End of transfer - DMA reached EDA and stopped
pub const DSR_EOT: u8 = 1 << 7;
/// End of message - at least one frame completed
pub const DSR_EOM: u8 = 1 << 6;
/// Buffer overflow (receive) / chain overflow (transmit)
pub const DSR_BOF: u8 = 1 << 5;
/// Counter overflow (receive)
pub const DSR_COF: u8 = 1 << 4;
/// DMA enabled
pub const DSR_DE: u8 = 1 << 1;

/// Event bits cleared by writing them back
pub const DSR_EVENTS: u8 = DSR_EOT | DSR_EOM | DSR_BOF | DSR_COF;

// =============================================================================
// DMA Command Register (DCR) Values
// =============================================================================

/// Abort any transfer in progress and stop the controller
pub const DCR_ABORT: u8 = 0x01;
/// Start the controller at CDA
pub const DCR_START: u8 = 0x02;

// =============================================================================
// DMA Interrupt Enable Register (DIR) Bits
// =============================================================================

/// Interrupt on end of message
pub const DIR_EOM: u8 = 1 << 6;
/// Interrupt on buffer / chain / counter overflow
pub const DIR_ERRORS: u8 = DSR_BOF | DSR_COF;

bitflags! {
    /// Typed view of the DMA status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DmaStatus: u8 {
        /// Controller reached the end descriptor and stopped
        const END_OF_TRANSFER = DSR_EOT;
        /// At least one frame completed
        const END_OF_MESSAGE = DSR_EOM;
        /// Receive buffer overflow, or transmit chain overflow (underrun)
        const BUFFER_OVERFLOW = DSR_BOF;
        /// Receive frame counter overflow
        const COUNTER_OVERFLOW = DSR_COF;
        /// Controller is running
        const ENABLED = DSR_DE;
    }
}

impl DmaStatus {
    /// Receive-side conditions that invalidate the whole ring
    pub const RING_FAULT: Self = Self::BUFFER_OVERFLOW.union(Self::COUNTER_OVERFLOW);

    /// Transmit-side chain overflow (the hardware ran out of frames mid-stream)
    pub const CHAIN_OVERFLOW: Self = Self::BUFFER_OVERFLOW;
}

// =============================================================================
// DMA Register Accessor
// =============================================================================

/// Accessor for one channel's receive or transmit DMA block.
pub struct DmaRegs<'a, R: RegisterSpace> {
    regs: &'a mut R,
    base: u16,
}

impl<'a, R: RegisterSpace> DmaRegs<'a, R> {
    /// Bind to the DMA block of `channel` for `direction`
    pub fn new(regs: &'a mut R, channel: usize, direction: Direction) -> Self {
        Self {
            regs,
            base: block_base(channel, direction),
        }
    }

    /// Read the current descriptor address
    #[inline]
    pub fn current_descriptor(&mut self) -> u32 {
        self.regs.read_u32(self.base + CDA)
    }

    /// Set the descriptor the controller starts from
    #[inline]
    pub fn set_current_descriptor(&mut self, addr: u32) {
        self.regs.write_u32(self.base + CDA, addr);
    }

    /// Move the end-of-chain boundary
    #[inline]
    pub fn set_end_descriptor(&mut self, addr: u32) {
        self.regs.write_u32(self.base + EDA, addr);
    }

    /// Program the receive buffer length
    #[inline]
    pub fn set_buffer_length(&mut self, len: u16) {
        self.regs.write_u16(self.base + BFL, len);
    }

    /// Read the DMA status
    #[inline]
    pub fn status(&mut self) -> DmaStatus {
        DmaStatus::from_bits_truncate(self.regs.read_u8(self.base + DSR))
    }

    /// Acknowledge status events (write-1-to-clear)
    #[inline]
    pub fn clear_status(&mut self, status: DmaStatus) {
        self.regs.write_u8(self.base + DSR, status.bits() & DSR_EVENTS);
    }

    /// Start the controller at CDA
    #[inline]
    pub fn start(&mut self) {
        self.regs.write_u8(self.base + DCR, DCR_START);
    }

    /// Abort the transfer in progress and halt the controller
    #[inline]
    pub fn abort(&mut self) {
        self.regs.write_u8(self.base + DCR, DCR_ABORT);
    }

    /// Enable or disable completion and error interrupts
    #[inline]
    pub fn set_interrupts(&mut self, enabled: bool) {
        let value = if enabled { DIR_EOM | DIR_ERRORS } else { 0 };
        self.regs.write_u8(self.base + DIR, value);
    }
}

/// Absolute offset of a DMA block
#[inline(always)]
pub const fn block_base(channel: usize, direction: Direction) -> u16 {
    let offset = match direction {
        Direction::Receive => RX_DMA_OFFSET,
        Direction::Transmit => TX_DMA_OFFSET,
    };
    channel_base(channel) + offset
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRegisterSpace;

    #[test]
    fn status_from_raw_keeps_known_bits_only() {
        let status = DmaStatus::from_bits_truncate(DSR_EOM | DSR_BOF | 0x01);
        assert!(status.contains(DmaStatus::END_OF_MESSAGE));
        assert!(status.intersects(DmaStatus::RING_FAULT));
        assert_eq!(status.bits() & 0x01, 0);
    }

    #[test]
    fn ring_fault_covers_both_overflow_bits() {
        assert!(DmaStatus::COUNTER_OVERFLOW.intersects(DmaStatus::RING_FAULT));
        assert!(DmaStatus::BUFFER_OVERFLOW.intersects(DmaStatus::RING_FAULT));
        assert!(!DmaStatus::END_OF_TRANSFER.intersects(DmaStatus::RING_FAULT));
    }

    #[test]
    fn blocks_are_distinct_per_direction() {
        assert_ne!(
            block_base(0, Direction::Receive),
            block_base(0, Direction::Transmit)
        );
        assert_eq!(block_base(1, Direction::Receive), 0x210);
    }

    #[test]
    fn accessor_writes_end_descriptor_and_commands() {
        let mut hw = MockRegisterSpace::new();
        {
            let mut dma = DmaRegs::new(&mut hw, 0, Direction::Transmit);
            dma.set_end_descriptor(0x0001_2340);
            dma.start();
        }
        let base = block_base(0, Direction::Transmit);
        assert_eq!(hw.peek_u32(base + EDA), 0x0001_2340);
        assert_eq!(hw.peek_u8(base + DCR), DCR_START);
    }

    #[test]
    fn clear_status_only_writes_event_bits() {
        let mut hw = MockRegisterSpace::new();
        {
            let mut dma = DmaRegs::new(&mut hw, 0, Direction::Receive);
            dma.clear_status(DmaStatus::END_OF_MESSAGE | DmaStatus::ENABLED);
        }
        let base = block_base(0, Direction::Receive);
        assert_eq!(hw.peek_u8(base + DSR), DSR_EOM);
    }
}
