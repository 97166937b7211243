//! Event delivery from the completion engine.
//!
//! The engine reports everything it finds through an [`EventSink`]. Two
//! sinks are provided:
//!
//! - [`Hooks`]: a registration table of callbacks, one per event kind, each
//!   defaulting to a no-op
//! - [`CompletionBatch`]: a buffer that records events while the board lock
//!   is held so they can be delivered after it is released

use crate::driver::error::ChannelError;
use crate::hal::ModemSignals;

/// Opaque caller token attached to a transmitted frame and handed back on
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameTag(pub usize);

/// Receiver of completion-engine events.
///
/// Every method has a no-op default so sinks only implement what they need.
pub trait EventSink {
    /// A frame arrived intact on `channel`
    fn frame_received(&mut self, channel: usize, data: &[u8]) {
        let _ = (channel, data);
    }

    /// The frame queued with `tag` left the transmitter
    fn transmit_done(&mut self, channel: usize, tag: FrameTag, len: usize) {
        let _ = (channel, tag, len);
    }

    /// A line-detected error occurred on `channel`
    fn channel_error(&mut self, channel: usize, error: ChannelError) {
        let _ = (channel, error);
    }

    /// Carrier or CTS changed on `channel`
    fn modem_changed(&mut self, channel: usize, signals: ModemSignals) {
        let _ = (channel, signals);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn frame_received(&mut self, channel: usize, data: &[u8]) {
        (**self).frame_received(channel, data);
    }

    fn transmit_done(&mut self, channel: usize, tag: FrameTag, len: usize) {
        (**self).transmit_done(channel, tag, len);
    }

    fn channel_error(&mut self, channel: usize, error: ChannelError) {
        (**self).channel_error(channel, error);
    }

    fn modem_changed(&mut self, channel: usize, signals: ModemSignals) {
        (**self).modem_changed(channel, signals);
    }
}

// =============================================================================
// Hook Table
// =============================================================================

/// Receive callback: `(channel, payload)`
pub type ReceiveHook<'h> = &'h (dyn Fn(usize, &[u8]) + Sync);
/// Transmit-done callback: `(channel, tag, length)`
pub type TransmitHook<'h> = &'h (dyn Fn(usize, FrameTag, usize) + Sync);
/// Error callback: `(channel, kind)`
pub type ErrorHook<'h> = &'h (dyn Fn(usize, ChannelError) + Sync);
/// Modem-change callback: `(channel, signals)`
pub type ModemHook<'h> = &'h (dyn Fn(usize, ModemSignals) + Sync);

/// Registration table with one replaceable callback per event kind.
#[derive(Clone, Copy, Default)]
pub struct Hooks<'h> {
    /// Called for every intact received frame
    pub on_receive: Option<ReceiveHook<'h>>,
    /// Called once per transmitted frame, in queue order
    pub on_transmit_done: Option<TransmitHook<'h>>,
    /// Called for every line-detected error
    pub on_error: Option<ErrorHook<'h>>,
    /// Called on carrier / CTS transitions
    pub on_modem_change: Option<ModemHook<'h>>,
}

impl<'h> Hooks<'h> {
    /// Table with every hook unset
    #[must_use]
    pub const fn new() -> Self {
        Self {
            on_receive: None,
            on_transmit_done: None,
            on_error: None,
            on_modem_change: None,
        }
    }
}

impl EventSink for Hooks<'_> {
    fn frame_received(&mut self, channel: usize, data: &[u8]) {
        if let Some(hook) = self.on_receive {
            hook(channel, data);
        }
    }

    fn transmit_done(&mut self, channel: usize, tag: FrameTag, len: usize) {
        if let Some(hook) = self.on_transmit_done {
            hook(channel, tag, len);
        }
    }

    fn channel_error(&mut self, channel: usize, error: ChannelError) {
        if let Some(hook) = self.on_error {
            hook(channel, error);
        }
    }

    fn modem_changed(&mut self, channel: usize, signals: ModemSignals) {
        if let Some(hook) = self.on_modem_change {
            hook(channel, signals);
        }
    }
}

// =============================================================================
// Completion Batch
// =============================================================================

/// One receive-side outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxRecord {
    /// Intact frame of this many bytes (payload kept alongside)
    Frame(usize),
    /// Receive error
    Error(ChannelError),
}

/// Events of one channel service, recorded for delivery after the board
/// lock is released.
///
/// One service completes at most `N - 1` slots per direction, so every
/// list is bounded by `N`. Received payloads are copied out of the ring,
/// which is why the batch carries `N` buffers of `BUF_SIZE` bytes.
pub struct CompletionBatch<const N: usize, const BUF_SIZE: usize> {
    channel: usize,
    rx: [RxRecord; N],
    rx_payloads: [[u8; BUF_SIZE]; N],
    rx_count: usize,
    underrun: bool,
    tx: [(FrameTag, usize); N],
    tx_count: usize,
    modem: Option<ModemSignals>,
}

impl<const N: usize, const BUF_SIZE: usize> CompletionBatch<N, BUF_SIZE> {
    /// Empty batch for `channel`
    #[must_use]
    pub const fn new(channel: usize) -> Self {
        Self {
            channel,
            rx: [RxRecord::Frame(0); N],
            rx_payloads: [[0u8; BUF_SIZE]; N],
            rx_count: 0,
            underrun: false,
            tx: [(FrameTag(0), 0); N],
            tx_count: 0,
            modem: None,
        }
    }

    /// Channel the batch was recorded for
    #[inline(always)]
    pub const fn channel(&self) -> usize {
        self.channel
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx_count == 0 && !self.underrun && self.tx_count == 0 && self.modem.is_none()
    }

    /// Deliver the recorded events: receive outcomes, then underrun, then
    /// transmit completions, then the modem change.
    pub fn dispatch<S: EventSink + ?Sized>(&self, sink: &mut S) {
        for (record, payload) in self.rx[..self.rx_count]
            .iter()
            .zip(&self.rx_payloads[..self.rx_count])
        {
            match *record {
                RxRecord::Frame(len) => sink.frame_received(self.channel, &payload[..len]),
                RxRecord::Error(error) => sink.channel_error(self.channel, error),
            }
        }
        if self.underrun {
            sink.channel_error(self.channel, ChannelError::Underrun);
        }
        for &(tag, len) in &self.tx[..self.tx_count] {
            sink.transmit_done(self.channel, tag, len);
        }
        if let Some(signals) = self.modem {
            sink.modem_changed(self.channel, signals);
        }
    }

    fn push_rx(&mut self, record: RxRecord) -> Option<usize> {
        debug_assert!(self.rx_count < N, "completion batch full, receive record lost");
        if self.rx_count >= N {
            return None;
        }
        let index = self.rx_count;
        self.rx[index] = record;
        self.rx_count += 1;
        Some(index)
    }
}

impl<const N: usize, const BUF_SIZE: usize> EventSink for CompletionBatch<N, BUF_SIZE> {
    fn frame_received(&mut self, _channel: usize, data: &[u8]) {
        let len = data.len().min(BUF_SIZE);
        if let Some(index) = self.push_rx(RxRecord::Frame(len)) {
            self.rx_payloads[index][..len].copy_from_slice(&data[..len]);
        }
    }

    fn transmit_done(&mut self, _channel: usize, tag: FrameTag, len: usize) {
        debug_assert!(self.tx_count < N, "completion batch full, transmit tag lost");
        if self.tx_count < N {
            self.tx[self.tx_count] = (tag, len);
            self.tx_count += 1;
        }
    }

    fn channel_error(&mut self, _channel: usize, error: ChannelError) {
        if error == ChannelError::Underrun {
            self.underrun = true;
        } else {
            self.push_rx(RxRecord::Error(error));
        }
    }

    fn modem_changed(&mut self, _channel: usize, signals: ModemSignals) {
        self.modem = Some(signals);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
