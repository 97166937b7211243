//! Synchronous Serial / E1 / G.703 Adapter Core
//!
//! A `no_std`, `no_alloc` data-path and line-monitoring core for multi-channel
//! synchronous serial adapters built around an HDLC controller with chained
//! DMA and an optional E1 / G.703 line interface per channel.
//!
//! # Architecture
//!
//! The crate is organized into four layers:
//!
//! 1. **Driver Layer** ([`driver`]): the [`Board`], its channels, control plane
//!    and the completion engine's events
//! 2. **Telemetry Layer** ([`telemetry`]): per-second line classification,
//!    15-minute intervals and history
//! 3. **HAL Layer** ([`hal`]): register-space and address-translation seams,
//!    line-interface and modem-signal sampling
//! 4. **Sync Layer** ([`sync`]): [`SharedBoard`], the critical-section guarded
//!    board used from interrupt, tick and control-plane contexts
//!
//! ## Data Path
//!
//! Each channel owns a receive and a transmit ring of `N` descriptors, each
//! paired with one `BUF_SIZE` buffer. The DMA controller owns the descriptors
//! between its current and end descriptor addresses; moving the end address
//! hands frames to the hardware. At most `N - 1` frames are in flight per
//! direction.
//!
//! ## Line Monitoring
//!
//! Channels in E1 or G.703 mode are sampled once per second. Every second is
//! classified (unavailable, errored, severely errored, ...), accumulated into
//! the open 15-minute interval and rotated into a 48-interval history.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for error and status types
//! - `log`: Log ring restarts, line errors and interval rotation through the
//!   `log` facade
//!
//! # Example
//!
//! ```ignore
//! use ph_sync_serial::{Board, BoardConfig, Direction, FrameTag, IdentityMapping};
//!
//! static mut BOARD: Board<PortIo, 2, 4, 1600> = Board::new(PortIo::new(0x300));
//!
//! let board = unsafe { &mut BOARD };
//! board.init(BoardConfig::new(), &IdentityMapping, &mut delay).unwrap();
//! board.enable(0, Direction::Receive, true).unwrap();
//! board.enable(0, Direction::Transmit, true).unwrap();
//!
//! board.send(0, &frame, FrameTag(1)).unwrap();
//!
//! // From the adapter interrupt
//! board.handle_interrupt(&mut sink);
//!
//! // Once per second
//! board.tick();
//! ```
//!
//! # Memory Requirements
//!
//! Each channel holds `2 * N * (16 + BUF_SIZE)` bytes of DMA memory plus its
//! telemetry state (50 intervals of 48 bytes). With the default
//! configuration (2 channels, 4 descriptors, 1600-byte buffers) that is about
//! 30 KB. The board must live in memory the adapter can reach by DMA and must
//! not move after [`Board::init`].

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels mirror the [lints] table in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod sync;
pub mod telemetry;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::board::{Board, BoardDefault};
pub use driver::config::{
    BoardConfig, ChannelConfig, ChannelMode, ClearScope, Direction, TelemetryConfig,
};
pub use driver::error::{
    ChannelError, ConfigError, ConfigResult, Error, Result, SendError, SendResult,
};
pub use driver::events::{EventSink, FrameTag, Hooks};
pub use driver::interrupt::InterruptStatus;
pub use driver::stats::{ChannelCounters, DirectionCounters};
pub use hal::{AddressTranslation, IdentityMapping, ModemSignals, RegisterSpace};
pub use sync::{SharedBoard, SharedBoardDefault};
pub use telemetry::{Classification, IntervalCounters, LineAlarms, LineSample, TelemetryState};

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the board APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Moving a DMA
/// controller's descriptor pointers behind the board's back desynchronizes
/// its rings.
pub mod unsafe_registers {
    pub use crate::internal::dma::{Descriptor, DescriptorStatus};
    pub use crate::internal::register::dma::{DmaRegs, DmaStatus};
}

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types.
pub mod constants {
    pub use crate::internal::constants::{
        // Ring and buffer sizes
        DEFAULT_BUFFER_SIZE,
        DEFAULT_CHANNELS,
        DEFAULT_RING_SIZE,
        // Classification thresholds
        E1_DEGRADED_PER_MILLE,
        E1_SES_BPV_THRESHOLD,
        E1_SES_PCV_THRESHOLD,
        G703_DEGRADED_DIVISOR,
        G703_SES_CV_THRESHOLD,
        // Telemetry windows
        HISTORY_INTERVALS,
        INTERVAL_SECONDS,
        MAX_BUFFER_SIZE,
        MAX_CHANNELS,
        // Timing
        RESET_PULSE_US,
        RESET_SETTLE_US,
        SECONDS_PER_MINUTE,
        SETTLE_SECONDS,
    };
}
