//! Configuration types for the synchronous serial core

use crate::internal::constants::{
    E1_DEGRADED_PER_MILLE, E1_SES_BPV_THRESHOLD, E1_SES_PCV_THRESHOLD, G703_DEGRADED_DIVISOR,
    G703_SES_CV_THRESHOLD, SETTLE_SECONDS,
};
use crate::internal::register::channel::{
    MODE_ASYNC, MODE_CRC4, MODE_E1, MODE_G703, MODE_HDLC,
};

use super::error::{ConfigError, ConfigResult};

/// Transfer direction of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Line to host
    Receive,
    /// Host to line
    Transmit,
}

/// Line protocol of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelMode {
    /// Asynchronous framing
    Async,
    /// HDLC framing on a plain synchronous port
    #[default]
    Hdlc,
    /// HDLC over a framed E1 line interface
    E1,
    /// HDLC over an unframed G.703 line interface
    G703,
}

impl ChannelMode {
    /// Whether the channel has a line interface that reports telemetry
    #[must_use]
    pub const fn is_line_mode(self) -> bool {
        matches!(self, ChannelMode::E1 | ChannelMode::G703)
    }

    /// Value for the channel mode register
    #[must_use]
    pub const fn to_reg_value(self) -> u8 {
        match self {
            ChannelMode::Async => MODE_ASYNC,
            ChannelMode::Hdlc => MODE_HDLC,
            ChannelMode::E1 => MODE_E1,
            ChannelMode::G703 => MODE_G703,
        }
    }
}

/// Per-channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Line protocol
    pub mode: ChannelMode,
    /// CRC-4 multiframing (E1 only). When enabled, path code violations are
    /// CRC-4 errors; otherwise they are frame alignment errors.
    pub crc4: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelConfig {
    /// Create an HDLC channel configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: ChannelMode::Hdlc,
            crc4: false,
        }
    }

    /// Set the line protocol
    #[must_use]
    pub const fn with_mode(mut self, mode: ChannelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable CRC-4 multiframing
    #[must_use]
    pub const fn with_crc4(mut self, enabled: bool) -> Self {
        self.crc4 = enabled;
        self
    }

    /// Value for the channel mode register
    #[must_use]
    pub const fn mode_register(&self) -> u8 {
        let mut value = self.mode.to_reg_value();
        if self.crc4 && matches!(self.mode, ChannelMode::E1) {
            value |= MODE_CRC4;
        }
        value
    }
}

/// Classification thresholds for the line telemetry engine.
///
/// The E1 degraded-minute limit is a rate and the G.703 one is a volume.
/// Both are kept as given rather than derived from each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryConfig {
    /// E1: bipolar violations per second for a severely errored second
    pub e1_ses_bpv: u32,
    /// E1: path code violations per second for a severely errored second
    pub e1_ses_pcv: u32,
    /// G.703: code violations per second for a severely errored second
    pub g703_ses_cv: u32,
    /// E1: a minute is degraded when `errors * 1000 > seconds * this`
    pub e1_degraded_per_mille: u32,
    /// G.703: a minute is degraded when `errors * this > seconds`
    pub g703_degraded_divisor: u32,
    /// Samples discarded after the line (re)synchronizes
    pub settle_seconds: u8,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryConfig {
    /// Create a configuration with the standard thresholds
    #[must_use]
    pub const fn new() -> Self {
        Self {
            e1_ses_bpv: E1_SES_BPV_THRESHOLD,
            e1_ses_pcv: E1_SES_PCV_THRESHOLD,
            g703_ses_cv: G703_SES_CV_THRESHOLD,
            e1_degraded_per_mille: E1_DEGRADED_PER_MILLE,
            g703_degraded_divisor: G703_DEGRADED_DIVISOR,
            settle_seconds: SETTLE_SECONDS,
        }
    }

    /// Set the E1 severely-errored-second thresholds
    #[must_use]
    pub const fn with_e1_ses_thresholds(mut self, bpv: u32, pcv: u32) -> Self {
        self.e1_ses_bpv = bpv;
        self.e1_ses_pcv = pcv;
        self
    }

    /// Set the G.703 severely-errored-second threshold
    #[must_use]
    pub const fn with_g703_ses_threshold(mut self, cv: u32) -> Self {
        self.g703_ses_cv = cv;
        self
    }

    /// Set the E1 degraded-minute rate
    #[must_use]
    pub const fn with_e1_degraded_per_mille(mut self, per_mille: u32) -> Self {
        self.e1_degraded_per_mille = per_mille;
        self
    }

    /// Set the G.703 degraded-minute divisor
    #[must_use]
    pub const fn with_g703_degraded_divisor(mut self, divisor: u32) -> Self {
        self.g703_degraded_divisor = divisor;
        self
    }

    /// Set the number of samples discarded after resynchronization
    #[must_use]
    pub const fn with_settle_seconds(mut self, seconds: u8) -> Self {
        self.settle_seconds = seconds;
        self
    }

    /// Reject thresholds that would make a classification meaningless
    pub fn validate(&self) -> ConfigResult<()> {
        if self.e1_ses_bpv == 0
            || self.e1_ses_pcv == 0
            || self.g703_ses_cv == 0
            || self.e1_degraded_per_mille == 0
            || self.g703_degraded_divisor == 0
        {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

/// Board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig<const CHANNELS: usize> {
    /// Per-channel configuration
    pub channels: [ChannelConfig; CHANNELS],
    /// Telemetry thresholds shared by every channel
    pub telemetry: TelemetryConfig,
}

impl<const CHANNELS: usize> Default for BoardConfig<CHANNELS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHANNELS: usize> BoardConfig<CHANNELS> {
    /// Every channel in HDLC mode, standard telemetry thresholds
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channels: [ChannelConfig::new(); CHANNELS],
            telemetry: TelemetryConfig::new(),
        }
    }

    /// Configure one channel. Indices outside the board are ignored.
    #[must_use]
    pub const fn with_channel(mut self, index: usize, config: ChannelConfig) -> Self {
        if index < CHANNELS {
            self.channels[index] = config;
        }
        self
    }

    /// Apply the same configuration to every channel
    #[must_use]
    pub const fn with_all_channels(mut self, config: ChannelConfig) -> Self {
        self.channels = [config; CHANNELS];
        self
    }

    /// Set the telemetry thresholds
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: TelemetryConfig) -> Self {
        self.telemetry = telemetry;
        self
    }
}

/// Extent of a `clear_statistics` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClearScope {
    /// Traffic counters and telemetry of one channel
    Channel(usize),
    /// Telemetry of one channel's line interface
    Line(usize),
    /// Everything on the board
    Board,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_config_default_is_hdlc() {
        let config = ChannelConfig::default();
        assert_eq!(config.mode, ChannelMode::Hdlc);
        assert!(!config.crc4);
        assert_eq!(config, ChannelConfig::new());
    }

    #[test]
    fn channel_config_builder_chaining() {
        let config = ChannelConfig::new()
            .with_mode(ChannelMode::E1)
            .with_crc4(true);
        assert_eq!(config.mode, ChannelMode::E1);
        assert!(config.crc4);
    }

    #[test]
    fn mode_register_sets_crc4_only_for_e1() {
        let e1 = ChannelConfig::new().with_mode(ChannelMode::E1).with_crc4(true);
        assert_eq!(e1.mode_register(), MODE_E1 | MODE_CRC4);

        let g703 = ChannelConfig::new().with_mode(ChannelMode::G703).with_crc4(true);
        assert_eq!(g703.mode_register(), MODE_G703);
    }

    #[test]
    fn line_modes() {
        assert!(ChannelMode::E1.is_line_mode());
        assert!(ChannelMode::G703.is_line_mode());
        assert!(!ChannelMode::Hdlc.is_line_mode());
        assert!(!ChannelMode::Async.is_line_mode());
    }

    #[test]
    fn telemetry_defaults_match_constants() {
        let config = TelemetryConfig::default();
        assert_eq!(config.e1_ses_bpv, 2048);
        assert_eq!(config.e1_ses_pcv, 832);
        assert_eq!(config.g703_ses_cv, 2048);
        assert_eq!(config.e1_degraded_per_mille, 2048);
        assert_eq!(config.g703_degraded_divisor, 2);
        assert_eq!(config.settle_seconds, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn telemetry_rejects_zero_thresholds() {
        let config = TelemetryConfig::new().with_g703_degraded_divisor(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfig));

        let config = TelemetryConfig::new().with_e1_ses_thresholds(2048, 0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfig));
    }

    #[test]
    fn board_config_with_channel() {
        let config = BoardConfig::<2>::new()
            .with_channel(1, ChannelConfig::new().with_mode(ChannelMode::G703))
            .with_channel(5, ChannelConfig::new().with_mode(ChannelMode::E1));
        assert_eq!(config.channels[0].mode, ChannelMode::Hdlc);
        assert_eq!(config.channels[1].mode, ChannelMode::G703);
    }

    #[test]
    fn board_config_with_all_channels() {
        let config =
            BoardConfig::<3>::new().with_all_channels(ChannelConfig::new().with_mode(ChannelMode::E1));
        assert!(config.channels.iter().all(|c| c.mode == ChannelMode::E1));
    }
}
