//! Transfer completion engine of one channel.
//!
//! Owns the receive and transmit rings and moves them between the hardware
//! and software:
//!
//! - receive slots are drained in order, classified, reported and re-armed
//!   at once so the controller never runs dry while enabled
//! - transmit slots are reclaimed in order and their tags handed back
//! - a receive ring fault discards the whole ring and restarts it at slot 0

use super::descriptor::DescriptorStatus;
use super::ring::DescriptorRing;
use crate::driver::config::Direction;
use crate::driver::error::{ChannelError, SendResult};
use crate::driver::events::{EventSink, FrameTag};
use crate::driver::stats::ChannelCounters;
use crate::hal::{AddressTranslation, RegisterSpace};
use crate::internal::register::dma::{DmaRegs, DmaStatus};

#[cfg(feature = "log")]
use log::{debug, warn};

/// Classify a completed receive descriptor.
///
/// Exactly one outcome per descriptor, in priority order: overrun, then
/// abort / short frame / residual bit, then a frame that did not end in this
/// buffer (reported as an overflow of the buffer, the ring keeps running),
/// then a CRC error on a complete frame.
pub fn rx_outcome(status: DescriptorStatus) -> Result<(), ChannelError> {
    if status.contains(DescriptorStatus::OVERRUN) {
        Err(ChannelError::Overrun)
    } else if status.intersects(DescriptorStatus::FRAMING) {
        Err(ChannelError::Framing)
    } else if !status.contains(DescriptorStatus::END_OF_FRAME) {
        Err(ChannelError::Overflow)
    } else if status.contains(DescriptorStatus::CRC_ERROR) {
        Err(ChannelError::Checksum)
    } else {
        Ok(())
    }
}

/// DMA engine of one channel with statically allocated rings.
///
/// # Type Parameters
/// * `N` - Descriptors per ring (`N - 1` frames in flight)
/// * `BUF_SIZE` - Size of each buffer in bytes (one frame per buffer)
pub struct DmaEngine<const N: usize, const BUF_SIZE: usize> {
    rx: DescriptorRing<N, BUF_SIZE>,
    tx: DescriptorRing<N, BUF_SIZE>,
}

impl<const N: usize, const BUF_SIZE: usize> DmaEngine<N, BUF_SIZE> {
    /// Create an engine with unlinked rings. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx: DescriptorRing::new(),
            tx: DescriptorRing::new(),
        }
    }

    /// Total memory usage in bytes.
    #[must_use]
    pub const fn memory_usage() -> usize {
        2 * N * (super::descriptor::Descriptor::SIZE + BUF_SIZE)
    }

    /// Link both rings at their final address.
    pub fn layout<A: AddressTranslation>(&mut self, translation: &A) {
        self.rx.layout(translation);
        self.tx.layout(translation);
    }

    /// Ring of one direction
    #[inline(always)]
    pub fn ring(&self, direction: Direction) -> &DescriptorRing<N, BUF_SIZE> {
        match direction {
            Direction::Receive => &self.rx,
            Direction::Transmit => &self.tx,
        }
    }

    /// Mutable ring of one direction
    #[cfg(test)]
    pub fn ring_mut(&mut self, direction: Direction) -> &mut DescriptorRing<N, BUF_SIZE> {
        match direction {
            Direction::Receive => &mut self.rx,
            Direction::Transmit => &mut self.tx,
        }
    }

    /// Slots that can still be armed in one direction
    #[inline]
    pub fn free_slots(&self, direction: Direction) -> usize {
        self.ring(direction).free_slots()
    }

    // =========================================================================
    // Enable / Disable
    // =========================================================================

    /// Arm every receive buffer and start the receive controller at slot 0.
    pub fn start_rx<R: RegisterSpace>(&mut self, regs: &mut R, channel: usize) {
        let mut dma = DmaRegs::new(regs, channel, Direction::Receive);
        dma.abort();
        self.rx.reset();
        self.rx.fill_for_receive();

        dma.set_buffer_length(BUF_SIZE as u16);
        dma.set_current_descriptor(self.rx.descriptor_addr(0));
        dma.set_end_descriptor(self.rx.descriptor_addr(self.rx.next_free()));
        dma.clear_status(DmaStatus::all());
        dma.set_interrupts(true);
        dma.start();
    }

    /// Start the transmit controller on an empty ring.
    pub fn start_tx<R: RegisterSpace>(&mut self, regs: &mut R, channel: usize) {
        let mut dma = DmaRegs::new(regs, channel, Direction::Transmit);
        dma.abort();
        self.tx.reset();

        let first = self.tx.descriptor_addr(0);
        dma.set_current_descriptor(first);
        dma.set_end_descriptor(first);
        dma.clear_status(DmaStatus::all());
        dma.set_interrupts(true);
        dma.start();
    }

    /// Halt one direction and drop its in-flight state.
    ///
    /// Pending transmit tags are discarded without a completion.
    pub fn stop<R: RegisterSpace>(&mut self, regs: &mut R, channel: usize, direction: Direction) {
        let mut dma = DmaRegs::new(regs, channel, direction);
        dma.abort();
        dma.set_interrupts(false);
        dma.clear_status(DmaStatus::all());
        match direction {
            Direction::Receive => self.rx.reset(),
            Direction::Transmit => self.tx.reset(),
        }
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Buffer of the next free transmit slot, for building a frame in place
    pub fn tx_buffer_mut(&mut self) -> Option<&mut [u8; BUF_SIZE]> {
        self.tx.next_free_buffer_mut()
    }

    /// Queue a frame and move the end-of-chain boundary past it.
    ///
    /// With `data == None` the frame must already be in
    /// [`Self::tx_buffer_mut`].
    pub fn transmit<R: RegisterSpace>(
        &mut self,
        regs: &mut R,
        channel: usize,
        data: Option<&[u8]>,
        len: usize,
        tag: FrameTag,
    ) -> SendResult<usize> {
        let slot = self.tx.enqueue(data, len, tag)?;

        let mut dma = DmaRegs::new(regs, channel, Direction::Transmit);
        dma.set_end_descriptor(self.tx.descriptor_addr(self.tx.next_free()));
        dma.start();
        Ok(slot)
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Drain completed receive slots.
    pub fn service_rx<R: RegisterSpace, S: EventSink + ?Sized>(
        &mut self,
        regs: &mut R,
        channel: usize,
        counters: &mut ChannelCounters,
        sink: &mut S,
    ) {
        let mut dma = DmaRegs::new(regs, channel, Direction::Receive);
        let status = dma.status();
        dma.clear_status(status);
        counters.rx.interrupts = counters.rx.interrupts.wrapping_add(1);

        if status.intersects(DmaStatus::RING_FAULT) {
            #[cfg(feature = "log")]
            warn!(
                "channel {}: receive ring fault (dsr=0x{:02x}), restarting ring",
                channel,
                status.bits()
            );
            counters.record_error(ChannelError::Overflow);
            sink.channel_error(channel, ChannelError::Overflow);
            self.start_rx(regs, channel);
            return;
        }

        let done = self.rx.completed(dma.current_descriptor());
        for _ in 0..done {
            let slot = self.rx.oldest_unconsumed();
            let desc = self.rx.descriptor(slot);
            match rx_outcome(desc.status()) {
                Ok(()) => {
                    let len = (desc.length() as usize).min(BUF_SIZE);
                    counters.rx.record_frame(len);
                    sink.frame_received(channel, &self.rx.buffer(slot)[..len]);
                }
                Err(error) => {
                    #[cfg(feature = "log")]
                    warn!(
                        "channel {}: receive error {} (status=0x{:02x})",
                        channel,
                        error.as_str(),
                        desc.status().bits()
                    );
                    counters.record_error(error);
                    sink.channel_error(channel, error);
                }
            }
            self.rx.recycle_oldest();
        }

        if done > 0 {
            dma.set_end_descriptor(self.rx.descriptor_addr(self.rx.next_free()));
            dma.start();
        }
    }

    /// Reclaim completed transmit slots.
    ///
    /// An underrun is reported before the completions of the same service.
    pub fn service_tx<R: RegisterSpace, S: EventSink + ?Sized>(
        &mut self,
        regs: &mut R,
        channel: usize,
        counters: &mut ChannelCounters,
        sink: &mut S,
    ) {
        let mut dma = DmaRegs::new(regs, channel, Direction::Transmit);
        let status = dma.status();
        dma.clear_status(status);
        counters.tx.interrupts = counters.tx.interrupts.wrapping_add(1);

        if status.contains(DmaStatus::CHAIN_OVERFLOW) {
            #[cfg(feature = "log")]
            warn!("channel {}: transmit underrun", channel);
            counters.record_error(ChannelError::Underrun);
            sink.channel_error(channel, ChannelError::Underrun);
        }

        let done = self.tx.completed(dma.current_descriptor());
        for _ in 0..done {
            let slot = self.tx.oldest_unconsumed();
            let len = self.tx.descriptor(slot).length() as usize;
            self.tx.descriptor(slot).reset();
            counters.tx.record_frame(len);
            if let Some(tag) = self.tx.take_tag(slot) {
                sink.transmit_done(channel, tag, len);
            }
            self.tx.advance();
        }

        #[cfg(feature = "log")]
        if done > 0 {
            debug!("channel {}: {} frames sent", channel, done);
        }
    }
}

impl<const N: usize, const BUF_SIZE: usize> Default for DmaEngine<N, BUF_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;

    use super::*;
    use crate::driver::error::SendError;
    use crate::hal::IdentityMapping;
    use crate::internal::register::dma::{BFL, CDA, DCR, DCR_START, DSR_BOF, DSR_COF, EDA, block_base};
    use crate::testing::{Event, MockRegisterSpace, RecordingSink};

    const CH: usize = 0;

    /// Complete the receive slot the controller points at and move on.
    fn hw_receive(engine: &mut DmaEngine<4, 64>, hw: &MockRegisterSpace, data: &[u8], status: DescriptorStatus) {
        let base = block_base(CH, Direction::Receive);
        let ring = engine.ring_mut(Direction::Receive);
        let slot = ring.index_of(hw.peek_u32(base + CDA)).unwrap();
        ring.buffer_mut(slot)[..data.len()].copy_from_slice(data);
        ring.descriptor(slot).complete(data.len() as u16, status);
        hw.set_current_descriptor(CH, Direction::Receive, ring.descriptor_addr(slot + 1));
    }

    #[test]
    fn outcome_priority() {
        use DescriptorStatus as S;
        assert_eq!(rx_outcome(S::END_OF_FRAME), Ok(()));
        assert_eq!(
            rx_outcome(S::OVERRUN | S::ABORT | S::CRC_ERROR),
            Err(ChannelError::Overrun)
        );
        assert_eq!(
            rx_outcome(S::END_OF_FRAME | S::SHORT_FRAME | S::CRC_ERROR),
            Err(ChannelError::Framing)
        );
        assert_eq!(
            rx_outcome(S::END_OF_FRAME | S::RESIDUAL_BIT),
            Err(ChannelError::Framing)
        );
        assert_eq!(
            rx_outcome(S::END_OF_FRAME | S::CRC_ERROR),
            Err(ChannelError::Checksum)
        );
        assert_eq!(rx_outcome(S::empty()), Err(ChannelError::Overflow));
        assert_eq!(rx_outcome(S::CRC_ERROR), Err(ChannelError::Overflow));
        assert_eq!(rx_outcome(S::ABORT), Err(ChannelError::Framing));
    }

    #[test]
    fn memory_usage_scales_with_ring() {
        assert_eq!(DmaEngine::<4, 64>::memory_usage(), 2 * 4 * (16 + 64));
        assert!(DmaEngine::<8, 1600>::memory_usage() > DmaEngine::<4, 1600>::memory_usage());
    }

    #[test]
    fn start_rx_programs_the_chain() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        engine.start_rx(&mut regs, CH);

        let base = block_base(CH, Direction::Receive);
        let ring = engine.ring(Direction::Receive);
        assert_eq!(hw.peek_u32(base + CDA), ring.descriptor_addr(0));
        assert_eq!(hw.peek_u32(base + EDA), ring.descriptor_addr(3));
        assert_eq!(hw.peek_u16(base + BFL), 64);
        assert_eq!(hw.peek_u8(base + DCR), DCR_START);
        assert_eq!(engine.free_slots(Direction::Receive), 0);
    }

    #[test]
    fn start_tx_leaves_ring_empty() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        engine.start_tx(&mut regs, CH);

        let base = block_base(CH, Direction::Transmit);
        let first = engine.ring(Direction::Transmit).descriptor_addr(0);
        assert_eq!(hw.peek_u32(base + CDA), first);
        assert_eq!(hw.peek_u32(base + EDA), first);
        assert_eq!(engine.free_slots(Direction::Transmit), 3);
    }

    #[test]
    fn transmit_moves_end_descriptor() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        engine.start_tx(&mut regs, CH);

        let slot = engine
            .transmit(&mut regs, CH, Some(&[1, 2, 3]), 3, FrameTag(1))
            .unwrap();

        let base = block_base(CH, Direction::Transmit);
        assert_eq!(slot, 0);
        assert_eq!(
            hw.peek_u32(base + EDA),
            engine.ring(Direction::Transmit).descriptor_addr(1)
        );
    }

    #[test]
    fn transmit_failure_leaves_hardware_untouched() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        engine.start_tx(&mut regs, CH);
        let writes = hw.writes().len();

        let big = [0u8; 65];
        assert_eq!(
            engine.transmit(&mut regs, CH, Some(&big), big.len(), FrameTag(0)),
            Err(SendError::FrameTooLarge)
        );
        assert_eq!(hw.writes().len(), writes);
    }

    #[test]
    fn service_rx_reports_frames_in_order_and_rearms() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        let mut counters = ChannelCounters::new();
        let mut sink = RecordingSink::new();
        engine.start_rx(&mut regs, CH);

        hw_receive(&mut engine, &hw, &[0xA1; 10], DescriptorStatus::END_OF_FRAME);
        hw_receive(&mut engine, &hw, &[0xB2; 20], DescriptorStatus::END_OF_FRAME);
        engine.service_rx(&mut regs, CH, &mut counters, &mut sink);

        assert_eq!(
            sink.events,
            vec![
                Event::Received(CH, vec![0xA1; 10]),
                Event::Received(CH, vec![0xB2; 20]),
            ]
        );
        assert_eq!(counters.rx.packets, 2);
        assert_eq!(counters.rx.bytes, 30);
        assert_eq!(counters.rx.interrupts, 1);

        let ring = engine.ring(Direction::Receive);
        assert_eq!(ring.oldest_unconsumed(), 2);
        assert_eq!(ring.in_flight(), 3);
        let base = block_base(CH, Direction::Receive);
        assert_eq!(hw.peek_u32(base + EDA), ring.descriptor_addr(ring.next_free()));
    }

    #[test]
    fn service_rx_overrun_without_end_of_frame_reports_once() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        let mut counters = ChannelCounters::new();
        let mut sink = RecordingSink::new();
        engine.start_rx(&mut regs, CH);

        hw_receive(&mut engine, &hw, &[0; 8], DescriptorStatus::OVERRUN);
        engine.service_rx(&mut regs, CH, &mut counters, &mut sink);

        assert_eq!(sink.events, vec![Event::Error(CH, ChannelError::Overrun)]);
        assert_eq!(counters.overrun, 1);
        assert_eq!(counters.rx.packets, 0);
    }

    #[test]
    fn service_rx_frame_longer_than_buffer_keeps_the_ring_running() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        let mut counters = ChannelCounters::new();
        let mut sink = RecordingSink::new();
        engine.start_rx(&mut regs, CH);

        // Buffer filled without an end of frame
        hw_receive(&mut engine, &hw, &[7; 64], DescriptorStatus::empty());
        hw_receive(&mut engine, &hw, &[8; 3], DescriptorStatus::END_OF_FRAME);
        engine.service_rx(&mut regs, CH, &mut counters, &mut sink);

        assert_eq!(
            sink.events,
            vec![
                Event::Error(CH, ChannelError::Overflow),
                Event::Received(CH, vec![8; 3]),
            ]
        );
        assert_eq!(counters.overflow, 1);
        assert_eq!(counters.rx.packets, 1);

        // Drained in order, not restarted
        let ring = engine.ring(Direction::Receive);
        assert_eq!(ring.oldest_unconsumed(), 2);
        assert_eq!(ring.in_flight(), 3);
        let base = block_base(CH, Direction::Receive);
        assert_eq!(hw.peek_u32(base + CDA), ring.descriptor_addr(2));
    }

    #[test]
    fn service_rx_ring_fault_restarts_from_slot_zero() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        let mut counters = ChannelCounters::new();
        let mut sink = RecordingSink::new();
        engine.start_rx(&mut regs, CH);

        hw_receive(&mut engine, &hw, &[1; 4], DescriptorStatus::END_OF_FRAME);
        hw_receive(&mut engine, &hw, &[2; 4], DescriptorStatus::END_OF_FRAME);
        hw.set_dma_status(CH, Direction::Receive, DSR_BOF | DSR_COF);
        engine.service_rx(&mut regs, CH, &mut counters, &mut sink);

        // In-flight frames are discarded, not drained
        assert_eq!(sink.events, vec![Event::Error(CH, ChannelError::Overflow)]);
        assert_eq!(counters.overflow, 1);

        let ring = engine.ring(Direction::Receive);
        let base = block_base(CH, Direction::Receive);
        assert_eq!(ring.oldest_unconsumed(), 0);
        assert_eq!(ring.in_flight(), 3);
        assert_eq!(hw.peek_u32(base + CDA), ring.descriptor_addr(0));
        assert!(ring.descriptor(0).status().is_empty());
    }

    #[test]
    fn service_tx_reports_underrun_before_completions() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        let mut counters = ChannelCounters::new();
        let mut sink = RecordingSink::new();
        engine.start_tx(&mut regs, CH);

        engine.transmit(&mut regs, CH, Some(&[0; 5]), 5, FrameTag(10)).unwrap();
        engine.transmit(&mut regs, CH, Some(&[0; 6]), 6, FrameTag(11)).unwrap();
        let end = engine.ring(Direction::Transmit).descriptor_addr(2);
        hw.set_current_descriptor(CH, Direction::Transmit, end);
        hw.set_dma_status(CH, Direction::Transmit, DSR_BOF);

        engine.service_tx(&mut regs, CH, &mut counters, &mut sink);

        assert_eq!(
            sink.events,
            vec![
                Event::Error(CH, ChannelError::Underrun),
                Event::TransmitDone(CH, FrameTag(10), 5),
                Event::TransmitDone(CH, FrameTag(11), 6),
            ]
        );
        assert_eq!(counters.underrun, 1);
        assert_eq!(counters.tx.bytes, 11);
        assert_eq!(engine.free_slots(Direction::Transmit), 3);
    }

    #[test]
    fn service_tx_ignores_slot_still_in_progress() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        let mut counters = ChannelCounters::new();
        let mut sink = RecordingSink::new();
        engine.start_tx(&mut regs, CH);

        engine.transmit(&mut regs, CH, Some(&[0; 5]), 5, FrameTag(1)).unwrap();
        engine.transmit(&mut regs, CH, Some(&[0; 5]), 5, FrameTag(2)).unwrap();
        // Controller is working on slot 1
        let current = engine.ring(Direction::Transmit).descriptor_addr(1);
        hw.set_current_descriptor(CH, Direction::Transmit, current);

        engine.service_tx(&mut regs, CH, &mut counters, &mut sink);

        assert_eq!(sink.events, vec![Event::TransmitDone(CH, FrameTag(1), 5)]);
        assert_eq!(engine.free_slots(Direction::Transmit), 2);
    }

    #[test]
    fn stop_discards_pending_tags() {
        let hw = MockRegisterSpace::for_board(1);
        let mut regs = hw.clone();
        let mut engine = DmaEngine::<4, 64>::new();
        engine.layout(&IdentityMapping);
        engine.start_tx(&mut regs, CH);
        engine.transmit(&mut regs, CH, Some(&[0; 5]), 5, FrameTag(1)).unwrap();

        engine.stop(&mut regs, CH, Direction::Transmit);

        assert_eq!(engine.free_slots(Direction::Transmit), 3);
        assert_eq!(engine.ring_mut(Direction::Transmit).take_tag(0), None);
    }
}
