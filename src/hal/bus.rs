//! Register-space and address-translation seams.
//!
//! The adapter exposes its control, DMA and line-interface registers through
//! a small byte/word address space. Everything in this crate talks to the
//! hardware through [`RegisterSpace`], so the same ring and telemetry code
//! runs against port I/O, memory-mapped windows, or a test double.

// =============================================================================
// Register Space Trait
// =============================================================================

/// Byte and word access to the adapter's register space.
///
/// Offsets are board-relative. Implementations must perform the access
/// immediately (no caching, no reordering relative to other accesses).
pub trait RegisterSpace {
    /// Read an 8-bit register
    fn read_u8(&mut self, offset: u16) -> u8;

    /// Write an 8-bit register
    fn write_u8(&mut self, offset: u16, value: u8);

    /// Read a 16-bit register
    fn read_u16(&mut self, offset: u16) -> u16;

    /// Write a 16-bit register
    fn write_u16(&mut self, offset: u16, value: u16);

    /// Read a 32-bit value split across two consecutive word registers
    /// (low word first).
    fn read_u32(&mut self, offset: u16) -> u32 {
        let lo = self.read_u16(offset) as u32;
        let hi = self.read_u16(offset.wrapping_add(2)) as u32;
        (hi << 16) | lo
    }

    /// Write a 32-bit value split across two consecutive word registers
    /// (low word first).
    fn write_u32(&mut self, offset: u16, value: u32) {
        self.write_u16(offset, value as u16);
        self.write_u16(offset.wrapping_add(2), (value >> 16) as u16);
    }
}

impl<T: RegisterSpace + ?Sized> RegisterSpace for &mut T {
    fn read_u8(&mut self, offset: u16) -> u8 {
        (**self).read_u8(offset)
    }

    fn write_u8(&mut self, offset: u16, value: u8) {
        (**self).write_u8(offset, value);
    }

    fn read_u16(&mut self, offset: u16) -> u16 {
        (**self).read_u16(offset)
    }

    fn write_u16(&mut self, offset: u16, value: u16) {
        (**self).write_u16(offset, value);
    }
}

// =============================================================================
// Address Translation
// =============================================================================

/// Translates CPU addresses of DMA memory into bus addresses the adapter's
/// DMA engine can use.
pub trait AddressTranslation {
    /// Bus address of the byte at `addr`
    fn to_physical(&self, addr: *const u8) -> u32;
}

/// Translation for systems where CPU and bus addresses are identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapping;

impl AddressTranslation for IdentityMapping {
    #[inline(always)]
    fn to_physical(&self, addr: *const u8) -> u32 {
        addr as usize as u32
    }
}

// =============================================================================
// Tests
// =============================================================================
