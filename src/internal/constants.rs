//! Centralized Constants
//!
//! Single source of truth for the magic numbers used by the ring and
//! telemetry code.
//!
//! # Organization
//!
//! - **Ring/Buffer sizes**: descriptor count and buffer dimensions
//! - **Timing**: reset pulse and settle delays
//! - **Telemetry windows**: second, minute and interval lengths
//! - **Classification thresholds**: severity and degraded-minute limits
//!
//! # Note
//!
//! Register offsets and bit definitions live in [`super::register`], next to
//! the hardware blocks they describe.

// =============================================================================
// Ring and Buffer Sizes
// =============================================================================

/// Default number of descriptors per ring
pub const DEFAULT_RING_SIZE: usize = 4;

/// Default DMA buffer size (one HDLC frame per buffer)
pub const DEFAULT_BUFFER_SIZE: usize = 1600;

/// Default number of channels per board
pub const DEFAULT_CHANNELS: usize = 2;

/// Largest buffer the 16-bit descriptor length field can describe
pub const MAX_BUFFER_SIZE: usize = u16::MAX as usize;

/// Maximum number of channels a board interrupt register can flag
pub const MAX_CHANNELS: usize = 8;

// =============================================================================
// Timing Constants
// =============================================================================

/// Width of the board reset pulse in microseconds
pub const RESET_PULSE_US: u32 = 10;

/// Time the DMA controllers need after reset before accepting commands
pub const RESET_SETTLE_US: u32 = 100;

// =============================================================================
// Telemetry Windows
// =============================================================================

/// Seconds in one degraded-minute window
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Seconds in one telemetry interval (15 minutes)
pub const INTERVAL_SECONDS: u32 = 900;

/// Number of closed intervals kept in history (12 hours)
pub const HISTORY_INTERVALS: usize = 48;

/// Samples discarded after the line interface (re)synchronizes
pub const SETTLE_SECONDS: u8 = 2;

// =============================================================================
// Classification Thresholds
// =============================================================================

/// E1: bipolar violations in one second that make it severely errored
pub const E1_SES_BPV_THRESHOLD: u32 = 2048;

/// E1: path code violations in one second that make it severely errored
pub const E1_SES_PCV_THRESHOLD: u32 = 832;

/// G.703: code violations in one second that make it severely errored
pub const G703_SES_CV_THRESHOLD: u32 = 2048;

/// E1: degraded-minute error rate, in errors per thousand seconds
///
/// 2048 errors per 1000 seconds is a 1e-6 bit error rate at 2.048 Mbit/s.
pub const E1_DEGRADED_PER_MILLE: u32 = 2048;

/// G.703: a minute is degraded when errors exceed seconds divided by this
pub const G703_DEGRADED_DIVISOR: u32 = 2;
