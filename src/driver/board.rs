//! Board: every channel of one adapter behind one register space.
//!
//! The board is the single owner of ring, counter and telemetry state. It is
//! not synchronized by itself; wrap it in a
//! [`SharedBoard`](crate::sync::SharedBoard) to share it between the
//! interrupt handler, the one-second tick and control-plane code.

use embedded_hal::delay::DelayNs;

use super::channel::Channel;
use super::config::{BoardConfig, ChannelMode, ClearScope, Direction, TelemetryConfig};
use super::error::{ConfigError, ConfigResult, SendError, SendResult};
use super::events::{EventSink, FrameTag};
use crate::hal::{AddressTranslation, RegisterSpace};
use crate::internal::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CHANNELS, DEFAULT_RING_SIZE, MAX_BUFFER_SIZE, MAX_CHANNELS,
    RESET_PULSE_US, RESET_SETTLE_US,
};
use crate::internal::register::{BOARD_ISR, BOARD_RESET, BOARD_RESET_ASSERT};
use crate::telemetry::Classification;

#[cfg(feature = "log")]
use log::{debug, info};

/// Adapter with `CHANNELS` channels, `N`-slot rings and `BUF_SIZE`-byte
/// buffers.
///
/// # Type Parameters
/// * `R` - Register space of the adapter
/// * `CHANNELS` - Number of serial channels (at most 8)
/// * `N` - Descriptors per ring (at least 2)
/// * `BUF_SIZE` - Bytes per buffer; one frame must fit in one buffer
///
/// # Memory Usage
///
/// Each channel holds `2 * N * (16 + BUF_SIZE)` bytes of DMA memory. The
/// board must not move after [`Board::init`], because the controllers hold
/// bus addresses of its descriptors and buffers.
pub struct Board<R: RegisterSpace, const CHANNELS: usize, const N: usize, const BUF_SIZE: usize> {
    regs: R,
    channels: [Channel<N, BUF_SIZE>; CHANNELS],
    telemetry: TelemetryConfig,
    initialized: bool,
}

/// Board with the default geometry: 2 channels, 4-slot rings, 1600-byte
/// buffers
pub type BoardDefault<R> = Board<R, DEFAULT_CHANNELS, DEFAULT_RING_SIZE, DEFAULT_BUFFER_SIZE>;

impl<R: RegisterSpace, const CHANNELS: usize, const N: usize, const BUF_SIZE: usize>
    Board<R, CHANNELS, N, BUF_SIZE>
{
    /// Create an uninitialized board. Const-compatible.
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            channels: [const { Channel::new() }; CHANNELS],
            telemetry: TelemetryConfig::new(),
            initialized: false,
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Reset the adapter and bring every channel to its idle state.
    ///
    /// Lays out the descriptor chains at their bus addresses, pulses the
    /// board reset, programs each channel's mode and leaves both directions
    /// of every channel disabled.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` on a second call
    /// - `InvalidConfig` if the board geometry or thresholds are unusable
    pub fn init<A: AddressTranslation, D: DelayNs>(
        &mut self,
        config: BoardConfig<CHANNELS>,
        translation: &A,
        delay: &mut D,
    ) -> ConfigResult<()> {
        if self.initialized {
            return Err(ConfigError::AlreadyInitialized);
        }
        if CHANNELS == 0 || CHANNELS > MAX_CHANNELS || N < 2 || BUF_SIZE == 0 || BUF_SIZE > MAX_BUFFER_SIZE
        {
            return Err(ConfigError::InvalidConfig);
        }
        config.telemetry.validate()?;
        self.telemetry = config.telemetry;

        self.regs.write_u8(BOARD_RESET, BOARD_RESET_ASSERT);
        delay.delay_us(RESET_PULSE_US);
        self.regs.write_u8(BOARD_RESET, 0);
        delay.delay_us(RESET_SETTLE_US);

        for (index, (channel, channel_config)) in
            self.channels.iter_mut().zip(config.channels).enumerate()
        {
            channel.init(
                &mut self.regs,
                index,
                channel_config,
                translation,
                &self.telemetry,
            );
        }
        self.regs.write_u8(BOARD_ISR, Self::channel_mask());
        self.initialized = true;

        #[cfg(feature = "log")]
        info!(
            "board initialized: {} channels, {} slots x {} bytes per ring",
            CHANNELS, N, BUF_SIZE
        );
        Ok(())
    }

    /// Check if the board has been initialized
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Register space of the adapter
    #[inline(always)]
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Telemetry thresholds in use
    #[inline(always)]
    pub fn telemetry_config(&self) -> &TelemetryConfig {
        &self.telemetry
    }

    /// Channel `index`, if it exists
    #[inline]
    pub fn channel(&self, index: usize) -> Option<&Channel<N, BUF_SIZE>> {
        self.channels.get(index)
    }

    /// Register space and channel `index`, once the board is initialized
    fn checked(&mut self, index: usize) -> ConfigResult<(&mut R, &mut Channel<N, BUF_SIZE>)> {
        if !self.initialized {
            return Err(ConfigError::NotInitialized);
        }
        let channel = self
            .channels
            .get_mut(index)
            .ok_or(ConfigError::InvalidChannel)?;
        Ok((&mut self.regs, channel))
    }

    const fn channel_mask() -> u8 {
        if CHANNELS >= 8 {
            u8::MAX
        } else {
            (1u8 << CHANNELS) - 1
        }
    }

    // =========================================================================
    // Control Plane
    // =========================================================================

    /// Start or stop one direction of a channel.
    ///
    /// Enabling re-arms the ring from slot 0, even if already enabled.
    /// Disabling synchronously halts the controller and discards pending
    /// descriptors of that direction; queued transmit tags are dropped
    /// without a completion.
    pub fn enable(&mut self, channel: usize, direction: Direction, enabled: bool) -> ConfigResult<()> {
        let (regs, ch) = self.checked(channel)?;
        ch.enable(regs, channel, direction, enabled);
        Ok(())
    }

    /// Switch a channel's line protocol.
    ///
    /// Entering E1 or G.703 starts the telemetry settle window. Ring and
    /// enable state are untouched.
    pub fn set_mode(&mut self, channel: usize, mode: ChannelMode) -> ConfigResult<()> {
        let telemetry = self.telemetry;
        let (regs, ch) = self.checked(channel)?;
        ch.set_mode(regs, channel, mode, &telemetry);
        Ok(())
    }

    /// Restart the telemetry settle window after the line resynchronized.
    pub fn resync_line(&mut self, channel: usize) -> ConfigResult<()> {
        let telemetry = self.telemetry;
        self.checked(channel)?.1.resync(&telemetry);
        Ok(())
    }

    /// Zero statistics.
    ///
    /// - `Channel(i)`: traffic counters and telemetry of channel `i`
    /// - `Line(i)`: telemetry of channel `i`
    /// - `Board`: everything on every channel
    ///
    /// Rings and enable state are never touched.
    pub fn clear_statistics(&mut self, scope: ClearScope) -> ConfigResult<()> {
        match scope {
            ClearScope::Channel(index) | ClearScope::Line(index) => {
                self.checked(index)?.1.clear_statistics(scope);
            }
            ClearScope::Board => {
                if !self.initialized {
                    return Err(ConfigError::NotInitialized);
                }
                for channel in &mut self.channels {
                    channel.clear_statistics(scope);
                }
            }
        }

        #[cfg(feature = "log")]
        debug!("statistics cleared: {:?}", scope);
        Ok(())
    }

    /// Slots that can still be armed in one direction of a channel
    pub fn free_slots(&self, channel: usize, direction: Direction) -> ConfigResult<usize> {
        self.channels
            .get(channel)
            .map(|ch| ch.free_slots(direction))
            .ok_or(ConfigError::InvalidChannel)
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    fn sendable(&mut self, channel: usize) -> SendResult<(&mut R, &mut Channel<N, BUF_SIZE>)> {
        let ch = self
            .channels
            .get_mut(channel)
            .ok_or(SendError::InvalidChannel)?;
        if !ch.is_enabled(Direction::Transmit) {
            return Err(SendError::NotEnabled);
        }
        Ok((&mut self.regs, ch))
    }

    /// Queue a frame for transmission.
    ///
    /// The frame is copied into the next free transmit buffer and `tag` is
    /// handed back through `transmit_done` once it has been sent. Never
    /// blocks; a failed send leaves the ring unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidChannel`, `NotEnabled`, `InvalidLength` (empty frame),
    /// `FrameTooLarge` (longer than one buffer) or `RingFull`, checked in
    /// that order.
    pub fn send(&mut self, channel: usize, data: &[u8], tag: FrameTag) -> SendResult<()> {
        let (regs, ch) = self.sendable(channel)?;
        if data.is_empty() {
            return Err(SendError::InvalidLength);
        }
        ch.transmit(regs, channel, Some(data), data.len(), tag)?;
        Ok(())
    }

    /// Next free transmit buffer, for building a frame in place.
    ///
    /// Returns `None` if the channel does not exist, its transmitter is
    /// disabled or the ring is full. Follow up with [`Board::send_prepared`].
    pub fn tx_buffer_mut(&mut self, channel: usize) -> Option<&mut [u8; BUF_SIZE]> {
        self.sendable(channel).ok()?.1.tx_buffer_mut()
    }

    /// Queue the first `len` bytes already written into
    /// [`Board::tx_buffer_mut`].
    pub fn send_prepared(&mut self, channel: usize, len: usize, tag: FrameTag) -> SendResult<()> {
        let (regs, ch) = self.sendable(channel)?;
        if len == 0 {
            return Err(SendError::InvalidLength);
        }
        ch.transmit(regs, channel, None, len, tag)?;
        Ok(())
    }

    // =========================================================================
    // Completion Signal
    // =========================================================================

    /// Read and acknowledge the board interrupt summary.
    ///
    /// Returns one bit per channel with a pending interrupt.
    pub fn take_pending(&mut self) -> u8 {
        if !self.initialized {
            return 0;
        }
        let pending = self.regs.read_u8(BOARD_ISR) & Self::channel_mask();
        if pending != 0 {
            self.regs.write_u8(BOARD_ISR, pending);
        }
        pending
    }

    /// Service one channel's interrupt, reporting to `sink`.
    pub fn service_channel<S: EventSink + ?Sized>(
        &mut self,
        channel: usize,
        sink: &mut S,
    ) -> ConfigResult<()> {
        let (regs, ch) = self.checked(channel)?;
        ch.service(regs, channel, sink);
        Ok(())
    }

    /// Completion-signal entry point: service every channel flagged in the
    /// board interrupt summary, lowest channel first.
    ///
    /// Events are delivered to `sink` while the board is borrowed; callbacks
    /// must not call back into the board. [`SharedBoard`] delivers them
    /// after releasing its lock instead.
    ///
    /// [`SharedBoard`]: crate::sync::SharedBoard
    pub fn handle_interrupt<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        let pending = self.take_pending();
        for index in 0..CHANNELS.min(MAX_CHANNELS) {
            if pending & (1 << index) != 0 {
                self.channels[index].service(&mut self.regs, index, sink);
            }
        }
    }

    // =========================================================================
    // One-Second Tick
    // =========================================================================

    /// Tick entry point: account one elapsed second on every channel in a
    /// line-monitoring mode.
    pub fn tick(&mut self) {
        if !self.initialized {
            return;
        }
        for (index, channel) in self.channels.iter_mut().enumerate() {
            channel.tick(&mut self.regs, index, &self.telemetry);
        }
    }

    /// Account one elapsed second on a single channel.
    ///
    /// Returns the classification, or `None` if the channel is not in a
    /// line mode or its sample was discarded while settling.
    pub fn tick_channel(&mut self, channel: usize) -> ConfigResult<Option<Classification>> {
        let telemetry = self.telemetry;
        let (regs, ch) = self.checked(channel)?;
        Ok(ch.tick(regs, channel, &telemetry))
    }

    /// Mutable channel, for driving the rings the way the controller does
    #[cfg(test)]
    pub(crate) fn channel_mut(&mut self, index: usize) -> &mut Channel<N, BUF_SIZE> {
        &mut self.channels[index]
    }
}

// =============================================================================
// Tests
// =============================================================================
