//! One serial channel: rings, enable state, counters and telemetry.
//!
//! A channel does not know its own index; the [`Board`](super::board::Board)
//! passes it in with every register access.

use super::config::{ChannelConfig, ChannelMode, ClearScope, Direction, TelemetryConfig};
use super::error::SendResult;
use super::events::{EventSink, FrameTag};
use super::interrupt::InterruptStatus;
use super::stats::ChannelCounters;
use crate::hal::{AddressTranslation, LineInterface, ModemSignals, RegisterSpace};
use crate::internal::dma::DmaEngine;
use crate::internal::register::channel::{self, CHAN_ISR, CHAN_MODE};
use crate::telemetry::{Classification, LineAlarms, TelemetryState};

#[cfg(feature = "log")]
use log::debug;

/// State of one channel.
pub struct Channel<const N: usize, const BUF_SIZE: usize> {
    config: ChannelConfig,
    dma: DmaEngine<N, BUF_SIZE>,
    rx_enabled: bool,
    tx_enabled: bool,
    counters: ChannelCounters,
    telemetry: TelemetryState,
    alarms: LineAlarms,
}

impl<const N: usize, const BUF_SIZE: usize> Channel<N, BUF_SIZE> {
    /// Idle HDLC channel with both directions disabled
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: ChannelConfig::new(),
            dma: DmaEngine::new(),
            rx_enabled: false,
            tx_enabled: false,
            counters: ChannelCounters::new(),
            telemetry: TelemetryState::new(),
            alarms: LineAlarms {
                los: false,
                carrier_lost: false,
                ais: false,
                out_of_frame: false,
                multiframe_loss: false,
                test_code: false,
                slip: false,
            },
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Line protocol
    #[inline(always)]
    pub fn mode(&self) -> ChannelMode {
        self.config.mode
    }

    /// Channel configuration
    #[inline(always)]
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Whether `direction` is running
    #[inline]
    pub fn is_enabled(&self, direction: Direction) -> bool {
        match direction {
            Direction::Receive => self.rx_enabled,
            Direction::Transmit => self.tx_enabled,
        }
    }

    /// Traffic and error counters
    #[inline(always)]
    pub fn counters(&self) -> &ChannelCounters {
        &self.counters
    }

    /// Line telemetry
    #[inline(always)]
    pub fn telemetry(&self) -> &TelemetryState {
        &self.telemetry
    }

    /// Alarm state of the most recent line sample
    #[inline(always)]
    pub fn line_alarms(&self) -> LineAlarms {
        self.alarms
    }

    /// Slots that can still be armed in `direction`
    #[inline]
    pub fn free_slots(&self, direction: Direction) -> usize {
        self.dma.free_slots(direction)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Bring the channel to its idle configured state.
    pub(crate) fn init<R: RegisterSpace, A: AddressTranslation>(
        &mut self,
        regs: &mut R,
        index: usize,
        config: ChannelConfig,
        translation: &A,
        telemetry: &TelemetryConfig,
    ) {
        self.dma.layout(translation);
        self.dma.stop(regs, index, Direction::Receive);
        self.dma.stop(regs, index, Direction::Transmit);
        self.rx_enabled = false;
        self.tx_enabled = false;
        self.counters.clear();
        self.telemetry.clear();
        self.alarms = LineAlarms::default();
        self.config = config;
        self.program_mode(regs, index, telemetry);
    }

    /// Switch the line protocol. Line modes start a settle window.
    pub(crate) fn set_mode<R: RegisterSpace>(
        &mut self,
        regs: &mut R,
        index: usize,
        mode: ChannelMode,
        telemetry: &TelemetryConfig,
    ) {
        self.config.mode = mode;
        self.program_mode(regs, index, telemetry);
    }

    fn program_mode<R: RegisterSpace>(
        &mut self,
        regs: &mut R,
        index: usize,
        telemetry: &TelemetryConfig,
    ) {
        regs.write_u8(channel::reg(index, CHAN_MODE), self.config.mode_register());
        if self.config.mode.is_line_mode() {
            self.telemetry.resync(telemetry.settle_seconds);
        }
    }

    /// Restart the telemetry settle window
    pub(crate) fn resync(&mut self, telemetry: &TelemetryConfig) {
        self.telemetry.resync(telemetry.settle_seconds);
    }

    /// Start or stop one direction.
    ///
    /// Enabling always re-arms the ring from slot 0. Disabling halts the
    /// controller and drops in-flight state of that direction only.
    pub(crate) fn enable<R: RegisterSpace>(
        &mut self,
        regs: &mut R,
        index: usize,
        direction: Direction,
        enabled: bool,
    ) {
        match (direction, enabled) {
            (Direction::Receive, true) => self.dma.start_rx(regs, index),
            (Direction::Transmit, true) => self.dma.start_tx(regs, index),
            (_, false) => self.dma.stop(regs, index, direction),
        }
        match direction {
            Direction::Receive => self.rx_enabled = enabled,
            Direction::Transmit => self.tx_enabled = enabled,
        }

        #[cfg(feature = "log")]
        debug!("channel {}: {:?} enabled={}", index, direction, enabled);
    }

    /// Zero the counters selected by `scope`
    pub(crate) fn clear_statistics(&mut self, scope: ClearScope) {
        match scope {
            ClearScope::Line(_) => self.telemetry.clear(),
            ClearScope::Channel(_) | ClearScope::Board => {
                self.counters.clear();
                self.telemetry.clear();
            }
        }
    }

    // =========================================================================
    // Data Path
    // =========================================================================

    /// Transmit buffer at the next free slot
    pub(crate) fn tx_buffer_mut(&mut self) -> Option<&mut [u8; BUF_SIZE]> {
        self.dma.tx_buffer_mut()
    }

    /// Queue a frame (copied from `data`, or already in place when `None`)
    pub(crate) fn transmit<R: RegisterSpace>(
        &mut self,
        regs: &mut R,
        index: usize,
        data: Option<&[u8]>,
        len: usize,
        tag: FrameTag,
    ) -> SendResult<usize> {
        self.dma.transmit(regs, index, data, len, tag)
    }

    /// Service one channel interrupt: receive, then transmit, then modem.
    pub(crate) fn service<R: RegisterSpace, S: EventSink + ?Sized>(
        &mut self,
        regs: &mut R,
        index: usize,
        sink: &mut S,
    ) -> InterruptStatus {
        let isr = channel::reg(index, CHAN_ISR);
        let status = InterruptStatus::from_raw(regs.read_u8(isr));
        if !status.any() {
            return status;
        }
        regs.write_u8(isr, status.to_raw());

        if status.rx_dma && self.rx_enabled {
            self.dma
                .service_rx(regs, index, &mut self.counters, sink);
        }
        if status.tx_dma && self.tx_enabled {
            self.dma
                .service_tx(regs, index, &mut self.counters, sink);
        }
        if status.modem_change {
            sink.modem_changed(index, ModemSignals::read(regs, index));
        }
        status
    }

    /// Account one elapsed second on the line interface.
    ///
    /// Channels without a line interface are skipped.
    pub(crate) fn tick<R: RegisterSpace>(
        &mut self,
        regs: &mut R,
        index: usize,
        telemetry: &TelemetryConfig,
    ) -> Option<Classification> {
        if !self.config.mode.is_line_mode() {
            return None;
        }
        let sample = LineInterface::new(index).sample(regs);
        self.alarms = sample.alarms;
        self.telemetry
            .record_second(self.config.mode, self.config.crc4, &sample, telemetry)
    }

    /// DMA engine, for driving the rings the way the controller does
    #[cfg(test)]
    pub(crate) fn dma_mut(&mut self) -> &mut DmaEngine<N, BUF_SIZE> {
        &mut self.dma
    }
}

impl<const N: usize, const BUF_SIZE: usize> Default for Channel<N, BUF_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
