//! Descriptor status bit field constants.
//!
//! The status byte is written by software when a descriptor is armed and by
//! the DMA controller when it releases the descriptor.

use bitflags::bitflags;

// =============================================================================
// Status Byte
// =============================================================================

/// Status byte bit field constants
pub mod status {
    /// End of message - descriptor holds the last (or only) buffer of a frame
    pub const EOM: u8 = 1 << 7;
    /// Short frame - frame shorter than the minimum allowed
    pub const SHORT_FRAME: u8 = 1 << 6;
    /// Abort - closing flag sequence aborted the frame
    pub const ABORT: u8 = 1 << 5;
    /// Residual bit - frame length not a multiple of 8 bits
    pub const RESIDUAL: u8 = 1 << 4;
    /// Overrun - receiver FIFO overrun during this frame
    pub const OVERRUN: u8 = 1 << 3;
    /// CRC error - frame check sequence mismatch
    pub const CRC_ERR: u8 = 1 << 2;
    /// End of transfer - controller stopped after this descriptor
    pub const EOT: u8 = 1 << 0;

    /// Bits that mark a receive frame as malformed
    pub const FRAMING_ERRORS: u8 = SHORT_FRAME | ABORT | RESIDUAL;
}

bitflags! {
    /// Typed view of a descriptor's status byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DescriptorStatus: u8 {
        /// Last buffer of a frame
        const END_OF_FRAME = status::EOM;
        /// Frame shorter than allowed
        const SHORT_FRAME = status::SHORT_FRAME;
        /// Frame aborted on the line
        const ABORT = status::ABORT;
        /// Frame ended on a non-octet boundary
        const RESIDUAL_BIT = status::RESIDUAL;
        /// Receiver overrun
        const OVERRUN = status::OVERRUN;
        /// Frame check sequence error
        const CRC_ERROR = status::CRC_ERR;
        /// Controller stopped after this descriptor
        const END_OF_TRANSFER = status::EOT;
    }
}

impl DescriptorStatus {
    /// Abort, short-frame and residual-bit conditions
    pub const FRAMING: Self = Self::from_bits_truncate(status::FRAMING_ERRORS);
}
