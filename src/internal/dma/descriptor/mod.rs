//! Chained DMA descriptor.
//!
//! Each descriptor points to one data buffer and to the next descriptor of
//! its ring. Ownership is never stored in the descriptor itself: the DMA
//! controller owns every descriptor between its current and end descriptor
//! address registers, software owns the rest.

pub mod bits;

pub use bits::DescriptorStatus;

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: VolatileCell is only accessed under the board lock, and the DMA
// controller only touches descriptors it owns.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        // SAFETY: the pointer comes from a live UnsafeCell
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        // SAFETY: the pointer comes from a live UnsafeCell
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }
}

/// DMA descriptor (16 bytes).
#[repr(C, align(4))]
pub struct Descriptor {
    /// Bus address of the next descriptor in the ring
    chain: VolatileCell<u32>,
    /// Bus address of the data buffer
    buffer: VolatileCell<u32>,
    /// Valid bytes in the buffer
    length: VolatileCell<u16>,
    /// Status flags
    status: VolatileCell<u8>,
    _reserved0: u8,
    _reserved1: u32,
}

impl Descriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chain: VolatileCell::new(0),
            buffer: VolatileCell::new(0),
            length: VolatileCell::new(0),
            status: VolatileCell::new(0),
            _reserved0: 0,
            _reserved1: 0,
        }
    }

    /// Bind the descriptor to its buffer and successor.
    pub fn link(&self, buffer: u32, next: u32) {
        self.buffer.set(buffer);
        self.chain.set(next);
        self.reset();
    }

    /// Mark the descriptor ready for the controller.
    ///
    /// Receive descriptors pass `None`; transmit descriptors pass the frame
    /// length, which also sets the end-of-frame flag.
    pub fn arm(&self, frame_len: Option<u16>) {
        match frame_len {
            Some(len) => {
                self.length.set(len);
                self.status.set(bits::status::EOM);
            }
            None => {
                self.length.set(0);
                self.status.set(0);
            }
        }
    }

    /// Return the descriptor to the free state.
    pub fn reset(&self) {
        self.length.set(0);
        self.status.set(0);
    }

    /// Status flags.
    #[inline(always)]
    #[must_use]
    pub fn status(&self) -> DescriptorStatus {
        DescriptorStatus::from_bits_truncate(self.status.get())
    }

    /// Valid bytes in the buffer.
    #[inline(always)]
    #[must_use]
    pub fn length(&self) -> u16 {
        self.length.get()
    }

    /// Bus address of the data buffer.
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.buffer.get()
    }

    /// Bus address of the next descriptor.
    #[inline(always)]
    #[must_use]
    pub fn next_desc_addr(&self) -> u32 {
        self.chain.get()
    }

    /// Write back a completion the way the DMA controller does.
    #[cfg(test)]
    pub fn complete(&self, len: u16, status: DescriptorStatus) {
        self.length.set(len);
        self.status.set(status.bits());
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: Descriptor uses volatile cells for all DMA-accessed fields
unsafe impl Sync for Descriptor {}
unsafe impl Send for Descriptor {}
