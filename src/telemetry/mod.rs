//! Line Telemetry Engine
//!
//! Once per second, each channel in E1 or G.703 mode samples its line
//! interface and classifies the elapsed second (see [`classify`]). The
//! result accumulates into the current 15-minute interval. Every 60 counted
//! seconds the degraded-minute tally is evaluated; every 900 counted seconds
//! the interval is closed:
//!
//! ```text
//! current ──rotate──> history[0] -> history[1] -> ... -> history[47] (evicted)
//!    │
//!    └──────────────> lifetime total += current
//! ```
//!
//! The first samples after the line (re)synchronizes are discarded while the
//! line interface settles.

pub mod classify;

pub use classify::{Classification, LineAlarms, LineSample, classify_e1, classify_g703};

use crate::driver::config::{ChannelMode, TelemetryConfig};
use crate::internal::constants::{HISTORY_INTERVALS, INTERVAL_SECONDS, SECONDS_PER_MINUTE};

#[cfg(feature = "log")]
use log::debug;

// =============================================================================
// Interval Counters
// =============================================================================

/// Performance counters for one accumulation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalCounters {
    /// Bipolar (code) violations
    pub bipolar_violations: u32,
    /// Frame alignment errors
    pub frame_sync_errors: u32,
    /// CRC-4 errors
    pub crc_errors: u32,
    /// Remote CRC-4 errors (E-bits)
    pub remote_crc_errors: u32,
    /// Seconds with loss of signal, carrier loss or AIS
    pub unavailable_seconds: u32,
    /// Seconds with path errors, out-of-frame or a slip
    pub errored_seconds: u32,
    /// Seconds over the severity threshold
    pub severely_errored_seconds: u32,
    /// Errored seconds under the severity threshold
    pub bursty_errored_seconds: u32,
    /// Seconds with bipolar violations
    pub line_errored_seconds: u32,
    /// Seconds with out-of-frame
    pub severely_errored_framing_seconds: u32,
    /// Seconds with a controlled slip
    pub controlled_slip_seconds: u32,
    /// Minutes over the degraded error rate
    pub degraded_minutes: u32,
}

impl IntervalCounters {
    /// All counters zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bipolar_violations: 0,
            frame_sync_errors: 0,
            crc_errors: 0,
            remote_crc_errors: 0,
            unavailable_seconds: 0,
            errored_seconds: 0,
            severely_errored_seconds: 0,
            bursty_errored_seconds: 0,
            line_errored_seconds: 0,
            severely_errored_framing_seconds: 0,
            controlled_slip_seconds: 0,
            degraded_minutes: 0,
        }
    }

    /// Add `other` into `self` (saturating)
    pub fn accumulate(&mut self, other: &Self) {
        self.bipolar_violations = self.bipolar_violations.saturating_add(other.bipolar_violations);
        self.frame_sync_errors = self.frame_sync_errors.saturating_add(other.frame_sync_errors);
        self.crc_errors = self.crc_errors.saturating_add(other.crc_errors);
        self.remote_crc_errors = self.remote_crc_errors.saturating_add(other.remote_crc_errors);
        self.unavailable_seconds = self
            .unavailable_seconds
            .saturating_add(other.unavailable_seconds);
        self.errored_seconds = self.errored_seconds.saturating_add(other.errored_seconds);
        self.severely_errored_seconds = self
            .severely_errored_seconds
            .saturating_add(other.severely_errored_seconds);
        self.bursty_errored_seconds = self
            .bursty_errored_seconds
            .saturating_add(other.bursty_errored_seconds);
        self.line_errored_seconds = self
            .line_errored_seconds
            .saturating_add(other.line_errored_seconds);
        self.severely_errored_framing_seconds = self
            .severely_errored_framing_seconds
            .saturating_add(other.severely_errored_framing_seconds);
        self.controlled_slip_seconds = self
            .controlled_slip_seconds
            .saturating_add(other.controlled_slip_seconds);
        self.degraded_minutes = self.degraded_minutes.saturating_add(other.degraded_minutes);
    }

    /// Whether every counter is zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::new()
    }
}

// =============================================================================
// Telemetry State
// =============================================================================

/// Telemetry accumulators of one channel.
///
/// Invariants: the lifetime total equals the sum of every rotated interval,
/// at most [`HISTORY_INTERVALS`] intervals are kept, and rotation happens
/// exactly once per [`INTERVAL_SECONDS`] counted seconds.
#[derive(Debug, Clone)]
pub struct TelemetryState {
    current: IntervalCounters,
    total: IntervalCounters,
    /// Newest first
    history: [IntervalCounters; HISTORY_INTERVALS],
    history_len: usize,
    /// Counted seconds in the current interval
    seconds: u32,
    /// Seconds of every rotated interval
    rotated_seconds: u32,
    /// Degraded-minute tally: seconds and errors since the last minute
    degraded_seconds: u32,
    degraded_errors: u32,
    /// Samples still to discard after resynchronization
    settle_remaining: u8,
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryState {
    /// Empty state, not settling
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: IntervalCounters::new(),
            total: IntervalCounters::new(),
            history: [IntervalCounters::new(); HISTORY_INTERVALS],
            history_len: 0,
            seconds: 0,
            rotated_seconds: 0,
            degraded_seconds: 0,
            degraded_errors: 0,
            settle_remaining: 0,
        }
    }

    /// Start a settle window of `seconds` discarded samples
    pub fn resync(&mut self, seconds: u8) {
        self.settle_remaining = seconds;
    }

    /// Whether the next sample will be discarded
    #[inline]
    pub fn is_settling(&self) -> bool {
        self.settle_remaining > 0
    }

    /// Account one elapsed second.
    ///
    /// Returns the classification, or `None` if the sample was discarded
    /// because the line is still settling. Modes without a line interface
    /// are ignored.
    pub fn record_second(
        &mut self,
        mode: ChannelMode,
        crc4: bool,
        sample: &LineSample,
        config: &TelemetryConfig,
    ) -> Option<Classification> {
        if self.settle_remaining > 0 {
            self.settle_remaining -= 1;
            return None;
        }

        let class = match mode {
            ChannelMode::E1 => classify_e1(sample, crc4, config),
            ChannelMode::G703 => classify_g703(sample, config),
            ChannelMode::Async | ChannelMode::Hdlc => return None,
        };

        self.current.accumulate(&class.counts);
        if let Some(errors) = class.degraded_errors {
            self.degraded_seconds += 1;
            self.degraded_errors = self.degraded_errors.saturating_add(errors);
        }

        self.seconds += 1;
        if self.seconds % SECONDS_PER_MINUTE == 0 {
            self.close_minute(mode, config);
        }
        if self.seconds >= INTERVAL_SECONDS {
            self.rotate();
        }

        Some(class)
    }

    fn close_minute(&mut self, mode: ChannelMode, config: &TelemetryConfig) {
        let degraded = match mode {
            ChannelMode::E1 => {
                classify::e1_minute_degraded(self.degraded_errors, self.degraded_seconds, config)
            }
            _ => classify::g703_minute_degraded(self.degraded_errors, self.degraded_seconds, config),
        };
        if degraded {
            self.current.degraded_minutes += 1;
        }
        self.degraded_seconds = 0;
        self.degraded_errors = 0;
    }

    /// Close the current interval into history and the lifetime total
    fn rotate(&mut self) {
        self.history.copy_within(0..HISTORY_INTERVALS - 1, 1);
        self.history[0] = self.current;
        self.history_len = (self.history_len + 1).min(HISTORY_INTERVALS);

        self.total.accumulate(&self.current);
        self.rotated_seconds = self.rotated_seconds.saturating_add(self.seconds);
        self.current = IntervalCounters::new();
        self.seconds = 0;

        #[cfg(feature = "log")]
        debug!(
            "telemetry interval closed, {} intervals in history",
            self.history_len
        );
    }

    /// Zero every counter, window and the history.
    ///
    /// A settle window in progress is kept.
    pub fn clear(&mut self) {
        let settle_remaining = self.settle_remaining;
        *self = Self::new();
        self.settle_remaining = settle_remaining;
    }

    /// Counters of the open interval
    #[inline(always)]
    pub fn current(&self) -> &IntervalCounters {
        &self.current
    }

    /// Lifetime counters including the open interval
    #[must_use]
    pub fn total(&self) -> IntervalCounters {
        let mut total = self.total;
        total.accumulate(&self.current);
        total
    }

    /// Closed interval `index`, 0 being the most recent
    #[must_use]
    pub fn interval(&self, index: usize) -> Option<&IntervalCounters> {
        self.history[..self.history_len].get(index)
    }

    /// Number of closed intervals kept
    #[inline(always)]
    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Counted seconds in the open interval
    #[inline(always)]
    pub fn seconds_in_interval(&self) -> u32 {
        self.seconds
    }

    /// Counted seconds since the last clear
    #[inline]
    pub fn total_seconds(&self) -> u32 {
        self.rotated_seconds.saturating_add(self.seconds)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
