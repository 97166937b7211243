//! Circular descriptor ring with paired data buffers.
//!
//! Slot `i` always owns descriptor `i` and buffer `i`; the successor of slot
//! `i` is `(i + 1) % N`. Two wrapping indices split the ring:
//!
//! ```text
//!   oldest_unconsumed          next_free
//!          v                       v
//!   [ armed | armed | ... | armed | gap | free ... ]
//! ```
//!
//! One slot is always left unarmed so that "empty" (`next_free ==
//! oldest_unconsumed`) and "full" (`next_free + 1 == oldest_unconsumed`) are
//! distinguishable. At most `N - 1` frames are in flight.

use super::descriptor::Descriptor;
use crate::driver::error::SendError;
use crate::driver::events::FrameTag;
use crate::hal::AddressTranslation;

/// Circular descriptor ring.
pub struct DescriptorRing<const N: usize, const BUF_SIZE: usize> {
    /// Hardware-visible descriptors
    pub(super) descriptors: [Descriptor; N],
    /// Data buffers, one per descriptor
    pub(super) buffers: [[u8; BUF_SIZE]; N],
    /// Caller tokens for armed transmit slots
    tags: [Option<FrameTag>; N],
    /// Next slot software must inspect
    oldest: usize,
    /// Next slot software may fill and arm
    next_free: usize,
    /// Bus address of `descriptors[0]`
    phys_base: u32,
}

impl<const N: usize, const BUF_SIZE: usize> DescriptorRing<N, BUF_SIZE> {
    /// Create an unlinked ring with zeroed buffers. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            descriptors: [const { Descriptor::new() }; N],
            buffers: [[0u8; BUF_SIZE]; N],
            tags: [None; N],
            oldest: 0,
            next_free: 0,
            phys_base: 0,
        }
    }

    /// Link every descriptor to its buffer and successor.
    ///
    /// Must run once the ring sits at its final address; the controller
    /// follows the bus addresses written here.
    pub fn layout<A: AddressTranslation>(&mut self, translation: &A) {
        self.phys_base = translation.to_physical(self.descriptors.as_ptr().cast());
        for i in 0..N {
            let buffer = translation.to_physical(self.buffers[i].as_ptr());
            let next = self.descriptor_addr((i + 1) % N);
            self.descriptors[i].link(buffer, next);
        }
        self.reset();
    }

    /// Return every slot to the free state and restart at index 0.
    pub fn reset(&mut self) {
        for desc in &self.descriptors {
            desc.reset();
        }
        self.tags = [None; N];
        self.oldest = 0;
        self.next_free = 0;
    }

    /// Number of slots in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring has no slots at all
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Frames that can be in flight at once
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N.saturating_sub(1)
    }

    /// Next slot software must inspect
    #[inline(always)]
    #[must_use]
    pub const fn oldest_unconsumed(&self) -> usize {
        self.oldest
    }

    /// Next slot software may fill and arm
    #[inline(always)]
    #[must_use]
    pub const fn next_free(&self) -> usize {
        self.next_free
    }

    /// Slots that can still be armed
    #[inline]
    #[must_use]
    pub fn free_slots(&self) -> usize {
        (N + self.oldest - self.next_free - 1) % N
    }

    /// Armed slots not yet consumed
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> usize {
        (N + self.next_free - self.oldest) % N
    }

    /// Mark slot `index` ready for the controller.
    #[inline]
    pub fn arm(&mut self, index: usize, frame_len: Option<u16>) {
        self.descriptors[index % N].arm(frame_len);
    }

    /// Move `oldest_unconsumed` to the next slot.
    #[inline(always)]
    pub fn advance(&mut self) {
        self.oldest = (self.oldest + 1) % N;
    }

    /// Queue a frame at `next_free`.
    ///
    /// With `data == None` the caller has already written `len` bytes into
    /// the buffer (see [`Self::next_free_buffer_mut`]). Returns the armed
    /// slot. Fails without touching the ring when the frame does not fit in
    /// one buffer or no slot is free.
    pub fn enqueue(
        &mut self,
        data: Option<&[u8]>,
        len: usize,
        tag: FrameTag,
    ) -> Result<usize, SendError> {
        if len > BUF_SIZE {
            return Err(SendError::FrameTooLarge);
        }
        if self.free_slots() == 0 {
            return Err(SendError::RingFull);
        }

        let slot = self.next_free;
        if let Some(data) = data {
            self.buffers[slot][..len].copy_from_slice(&data[..len]);
        }
        self.tags[slot] = Some(tag);
        self.arm(slot, Some(len as u16));
        self.next_free = (slot + 1) % N;
        Ok(slot)
    }

    /// Arm every usable slot with an empty receive buffer.
    pub fn fill_for_receive(&mut self) {
        while self.free_slots() > 0 {
            self.arm(self.next_free, None);
            self.next_free = (self.next_free + 1) % N;
        }
    }

    /// Consume the oldest receive slot and hand one buffer back to the
    /// controller.
    ///
    /// The consumed slot becomes the new gap and the previous gap is armed,
    /// so the controller keeps `N - 1` empty buffers.
    pub fn recycle_oldest(&mut self) {
        self.descriptors[self.oldest].reset();
        self.arm(self.next_free, None);
        self.next_free = (self.next_free + 1) % N;
        self.advance();
    }

    /// Slots the controller finished since `oldest_unconsumed`, given its
    /// current descriptor address.
    ///
    /// Addresses outside the ring report nothing completed.
    #[must_use]
    pub fn completed(&self, current_desc: u32) -> usize {
        match self.index_of(current_desc) {
            Some(index) => ((N + index - self.oldest) % N).min(self.in_flight()),
            None => 0,
        }
    }

    /// Slot index of the descriptor at bus address `addr`
    #[must_use]
    pub fn index_of(&self, addr: u32) -> Option<usize> {
        let offset = addr.wrapping_sub(self.phys_base) as usize;
        if offset % Descriptor::SIZE != 0 {
            return None;
        }
        let index = offset / Descriptor::SIZE;
        (index < N).then_some(index)
    }

    /// Bus address of the descriptor in slot `index`
    #[inline]
    #[must_use]
    pub fn descriptor_addr(&self, index: usize) -> u32 {
        self.phys_base
            .wrapping_add(((index % N) * Descriptor::SIZE) as u32)
    }

    /// Descriptor in slot `index`
    #[inline(always)]
    pub fn descriptor(&self, index: usize) -> &Descriptor {
        &self.descriptors[index % N]
    }

    /// Buffer in slot `index`
    #[inline(always)]
    pub fn buffer(&self, index: usize) -> &[u8; BUF_SIZE] {
        &self.buffers[index % N]
    }

    /// Buffer in slot `index`, for writing the way the controller does
    #[cfg(test)]
    pub fn buffer_mut(&mut self, index: usize) -> &mut [u8; BUF_SIZE] {
        &mut self.buffers[index % N]
    }

    /// Buffer at `next_free`, if a slot is free
    pub fn next_free_buffer_mut(&mut self) -> Option<&mut [u8; BUF_SIZE]> {
        if self.free_slots() == 0 {
            return None;
        }
        Some(&mut self.buffers[self.next_free])
    }

    /// Remove the caller token of slot `index`
    #[inline]
    pub fn take_tag(&mut self, index: usize) -> Option<FrameTag> {
        self.tags[index % N].take()
    }
}

impl<const N: usize, const BUF_SIZE: usize> Default for DescriptorRing<N, BUF_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
