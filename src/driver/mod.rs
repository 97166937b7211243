//! Core driver components for the serial adapter.
//!
//! This module contains the building blocks for configuring and operating
//! the board:
//!
//! - [`board`] - The board: channels, control plane and entry points
//! - [`channel`] - Per-channel rings, counters and telemetry
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`events`] - Hook table, event sink and completion batches
//! - [`stats`] - Traffic and error counters
//!
//! # Example
//!
//! ```ignore
//! use ph_sync_serial::driver::{BoardConfig, ChannelConfig, ChannelMode};
//!
//! let config = BoardConfig::<2>::new()
//!     .with_channel(1, ChannelConfig::new().with_mode(ChannelMode::E1).with_crc4(true));
//! ```

// Submodules
pub mod board;
pub mod channel;
pub mod config;
pub mod error;
pub mod events;
pub mod interrupt;
pub mod stats;

// Re-exports for convenience
pub use board::{Board, BoardDefault};
pub use channel::Channel;
pub use config::{
    BoardConfig, ChannelConfig, ChannelMode, ClearScope, Direction, TelemetryConfig,
};
pub use error::{
    ChannelError, ConfigError, ConfigResult, Error, Result, SendError, SendResult,
};
pub use events::{CompletionBatch, EventSink, FrameTag, Hooks};
pub use interrupt::InterruptStatus;
pub use stats::{ChannelCounters, DirectionCounters};
