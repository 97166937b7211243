//! Traffic counters kept by the completion engine.

use super::error::ChannelError;

/// Counters for one direction of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirectionCounters {
    /// DMA completion signals serviced
    pub interrupts: u32,
    /// Payload bytes moved
    pub bytes: u64,
    /// Frames moved
    pub packets: u32,
    /// Line-detected errors
    pub errors: u32,
}

impl DirectionCounters {
    /// All counters zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interrupts: 0,
            bytes: 0,
            packets: 0,
            errors: 0,
        }
    }

    /// Count one frame of `len` bytes
    #[inline]
    pub fn record_frame(&mut self, len: usize) {
        self.packets = self.packets.wrapping_add(1);
        self.bytes = self.bytes.wrapping_add(len as u64);
    }
}

/// Traffic and error counters of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCounters {
    /// Receive direction
    pub rx: DirectionCounters,
    /// Transmit direction
    pub tx: DirectionCounters,
    /// Receive framing errors
    pub framing: u32,
    /// Receive checksum errors
    pub checksum: u32,
    /// Receive overruns
    pub overrun: u32,
    /// Receive ring overflows
    pub overflow: u32,
    /// Transmit underruns
    pub underrun: u32,
}

impl ChannelCounters {
    /// All counters zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx: DirectionCounters::new(),
            tx: DirectionCounters::new(),
            framing: 0,
            checksum: 0,
            overrun: 0,
            overflow: 0,
            underrun: 0,
        }
    }

    /// Count one line-detected error against its kind and direction
    pub fn record_error(&mut self, error: ChannelError) {
        let (kind, direction) = match error {
            ChannelError::Framing => (&mut self.framing, &mut self.rx),
            ChannelError::Checksum => (&mut self.checksum, &mut self.rx),
            ChannelError::Overrun => (&mut self.overrun, &mut self.rx),
            ChannelError::Overflow => (&mut self.overflow, &mut self.rx),
            ChannelError::Underrun => (&mut self.underrun, &mut self.tx),
        };
        *kind = kind.wrapping_add(1);
        direction.errors = direction.errors.wrapping_add(1);
    }

    /// Zero every counter
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
