//! Error types for the synchronous serial core
//!
//! Errors are organized by domain:
//! - [`ConfigError`]: Initialization, configuration and addressing failures
//! - [`SendError`]: Transmit requests refused synchronously
//! - [`ChannelError`]: Line-detected errors delivered through the error hook
//!
//! The unified [`Error`] enum wraps the two domains that are returned to
//! callers. [`ChannelError`] is never returned; it is reported to the
//! registered error hook and counted.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and addressing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel index outside the board
    InvalidChannel,
    /// Invalid configuration parameter
    InvalidConfig,
    /// Board already initialized
    AlreadyInitialized,
    /// Board not initialized yet
    NotInitialized,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidChannel => "invalid channel",
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::NotInitialized => "not initialized",
        }
    }
}

// =============================================================================
// Send Errors
// =============================================================================

/// Transmit request errors
///
/// A failed send never modifies the transmit ring and is never retried
/// internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError {
    /// Frame longer than one ring buffer
    FrameTooLarge,
    /// Every usable transmit slot is in flight
    RingFull,
    /// Zero-length frame
    InvalidLength,
    /// Transmit direction is disabled
    NotEnabled,
    /// Channel index outside the board
    InvalidChannel,
}

impl core::fmt::Display for SendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SendError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SendError::FrameTooLarge => "frame too large for buffer",
            SendError::RingFull => "transmit ring full",
            SendError::InvalidLength => "invalid frame length",
            SendError::NotEnabled => "transmitter not enabled",
            SendError::InvalidChannel => "invalid channel",
        }
    }
}

// =============================================================================
// Channel Errors
// =============================================================================

/// Line-detected errors, reported through the error hook.
///
/// None of these is fatal to the channel. An [`ChannelError::Overflow`]
/// raised by a DMA ring fault also resets and restarts the receive ring; one
/// raised by a single oversized frame does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// Frame aborted, too short, or not a whole number of octets
    Framing,
    /// Frame check sequence mismatch
    Checksum,
    /// Receiver could not keep up with the line
    Overrun,
    /// Frame longer than one buffer, or the receive DMA ran out of buffers
    /// or its frame counter overflowed
    Overflow,
    /// Transmit DMA ran out of frames mid-stream
    Underrun,
}

impl core::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ChannelError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChannelError::Framing => "framing error",
            ChannelError::Checksum => "checksum error",
            ChannelError::Overrun => "receive overrun",
            ChannelError::Overflow => "receive buffer overflow",
            ChannelError::Underrun => "transmit underrun",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps the domain errors returned by board methods.
///
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InvalidChannel)) => { /* ... */ }
///     Err(Error::Send(SendError::RingFull)) => { /* retry later */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Send error
    Send(SendError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Send(e) => write!(f, "send: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<SendError> for Error {
    fn from(e: SendError) -> Self {
        Error::Send(e)
    }
}

/// Result type alias for board operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for transmit requests
pub type SendResult<T> = core::result::Result<T, SendError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn config_error_as_str_non_empty() {
        let variants = [
            ConfigError::InvalidChannel,
            ConfigError::InvalidConfig,
            ConfigError::AlreadyInitialized,
            ConfigError::NotInitialized,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "ConfigError::{variant:?} has empty string");
        }
    }

    #[test]
    fn config_error_display() {
        assert_eq!(format!("{}", ConfigError::InvalidChannel), "invalid channel");
    }

    #[test]
    fn send_error_as_str_non_empty() {
        let variants = [
            SendError::FrameTooLarge,
            SendError::RingFull,
            SendError::InvalidLength,
            SendError::NotEnabled,
            SendError::InvalidChannel,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "SendError::{variant:?} has empty string");
        }
    }

    #[test]
    fn send_error_display() {
        assert_eq!(format!("{}", SendError::RingFull), "transmit ring full");
    }

    #[test]
    fn channel_error_strings_are_distinct() {
        let variants = [
            ChannelError::Framing,
            ChannelError::Checksum,
            ChannelError::Overrun,
            ChannelError::Overflow,
            ChannelError::Underrun,
        ];

        for (i, a) in variants.iter().enumerate() {
            for b in &variants[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::NotInitialized.into();
        assert_eq!(err, Error::Config(ConfigError::NotInitialized));
    }

    #[test]
    fn error_from_send_error() {
        let err: Error = SendError::FrameTooLarge.into();
        assert_eq!(err, Error::Send(SendError::FrameTooLarge));
    }

    #[test]
    fn error_display_carries_domain_prefix() {
        let display = format!("{}", Error::Send(SendError::RingFull));
        assert!(display.starts_with("send:"));
        assert!(display.contains("ring full"));

        let display = format!("{}", Error::Config(ConfigError::InvalidConfig));
        assert!(display.starts_with("config:"));
    }

    #[test]
    fn question_mark_converts_domain_errors() {
        fn inner() -> Result<()> {
            Err(SendError::NotEnabled)?;
            Ok(())
        }
        assert_eq!(inner(), Err(Error::Send(SendError::NotEnabled)));
    }
}
