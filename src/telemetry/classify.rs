//! Per-second classification of line samples.
//!
//! A second is either unavailable (no usable signal) or available, in which
//! case it may be line errored, errored, severely errored, bursty errored,
//! severely errored framing and/or a controlled slip second. The result is
//! expressed as a one-second [`IntervalCounters`] delta so that accumulation
//! is a plain sum.

use super::IntervalCounters;
use crate::driver::config::TelemetryConfig;
use crate::internal::register::line::{
    LINE_SR_AIS, LINE_SR_LOS, LINE_SR_OOF, LINE_SR_OOMF, LINE_SR_RCL, LINE_SR_SLIP,
    LINE_SR_TEST_CODE,
};

/// Alarm indications of a line interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineAlarms {
    /// Loss of signal
    pub los: bool,
    /// Receive carrier lost
    pub carrier_lost: bool,
    /// Alarm indication signal (all ones)
    pub ais: bool,
    /// Frame alignment lost
    pub out_of_frame: bool,
    /// CRC-4 multiframe alignment lost
    pub multiframe_loss: bool,
    /// Loopback test code detected
    pub test_code: bool,
    /// Controlled slip in the elastic store
    pub slip: bool,
}

impl LineAlarms {
    /// Decode the line status register
    #[inline]
    pub fn from_raw(status: u8) -> Self {
        Self {
            los: (status & LINE_SR_LOS) != 0,
            carrier_lost: (status & LINE_SR_RCL) != 0,
            ais: (status & LINE_SR_AIS) != 0,
            out_of_frame: (status & LINE_SR_OOF) != 0,
            multiframe_loss: (status & LINE_SR_OOMF) != 0,
            test_code: (status & LINE_SR_TEST_CODE) != 0,
            slip: (status & LINE_SR_SLIP) != 0,
        }
    }

    /// No usable signal: the second cannot be classified further
    #[inline]
    pub fn is_unavailable(&self) -> bool {
        self.los || self.carrier_lost || self.ais
    }
}

/// Alarms and latched error counts for one elapsed second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineSample {
    /// Alarm state at the end of the second
    pub alarms: LineAlarms,
    /// Bipolar (code) violations
    pub bipolar_violations: u32,
    /// CRC-4 errors (E1)
    pub crc_errors: u32,
    /// Frame alignment errors (E1)
    pub frame_sync_errors: u32,
    /// Remote CRC-4 errors reported through E-bits (E1)
    pub remote_crc_errors: u32,
}

/// Outcome of classifying one second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// Counters this second adds to the current interval
    pub counts: IntervalCounters,
    /// Error volume this second adds to the degraded-minute tally, or `None`
    /// if the second does not take part (unavailable or severely errored)
    pub degraded_errors: Option<u32>,
}

impl Classification {
    fn unavailable() -> Self {
        Self {
            counts: IntervalCounters {
                unavailable_seconds: 1,
                ..IntervalCounters::new()
            },
            degraded_errors: None,
        }
    }

    /// Whether the second was unavailable
    #[inline]
    pub fn is_unavailable(&self) -> bool {
        self.counts.unavailable_seconds != 0
    }
}

/// Classify one E1 second.
///
/// Path code violations are CRC-4 errors when CRC-4 multiframing is on and
/// frame alignment errors otherwise.
pub fn classify_e1(sample: &LineSample, crc4: bool, config: &TelemetryConfig) -> Classification {
    let alarms = &sample.alarms;
    if alarms.is_unavailable() {
        return Classification::unavailable();
    }

    let bpv = sample.bipolar_violations;
    let pcv = if crc4 {
        sample.crc_errors
    } else {
        sample.frame_sync_errors
    };

    let mut counts = IntervalCounters {
        bipolar_violations: bpv,
        frame_sync_errors: sample.frame_sync_errors,
        crc_errors: sample.crc_errors,
        remote_crc_errors: sample.remote_crc_errors,
        ..IntervalCounters::new()
    };

    if bpv > 0 {
        counts.line_errored_seconds = 1;
    }
    if pcv > 0 || alarms.out_of_frame || alarms.slip {
        counts.errored_seconds = 1;
    }
    if alarms.out_of_frame {
        counts.severely_errored_framing_seconds = 1;
    }
    if alarms.slip {
        counts.controlled_slip_seconds = 1;
    }

    let degraded_errors = if bpv >= config.e1_ses_bpv || pcv >= config.e1_ses_pcv {
        counts.severely_errored_seconds = 1;
        None
    } else {
        if pcv > 0 {
            counts.bursty_errored_seconds = 1;
        }
        Some(bpv)
    };

    Classification {
        counts,
        degraded_errors,
    }
}

/// Classify one G.703 second.
///
/// An unframed line only reports code violations, which count both as line
/// and path errors.
pub fn classify_g703(sample: &LineSample, config: &TelemetryConfig) -> Classification {
    if sample.alarms.is_unavailable() {
        return Classification::unavailable();
    }

    let cv = sample.bipolar_violations;
    let mut counts = IntervalCounters {
        bipolar_violations: cv,
        ..IntervalCounters::new()
    };

    if cv > 0 {
        counts.line_errored_seconds = 1;
        counts.errored_seconds = 1;
    }

    let degraded_errors = if cv >= config.g703_ses_cv {
        counts.severely_errored_seconds = 1;
        None
    } else {
        if cv > 0 {
            counts.bursty_errored_seconds = 1;
        }
        Some(cv)
    };

    Classification {
        counts,
        degraded_errors,
    }
}

/// E1 degraded-minute test: error rate above the configured per-mille rate
#[inline]
pub fn e1_minute_degraded(errors: u32, seconds: u32, config: &TelemetryConfig) -> bool {
    u64::from(errors) * 1000 > u64::from(seconds) * u64::from(config.e1_degraded_per_mille)
}

/// G.703 degraded-minute test: error volume above a fraction of the seconds
#[inline]
pub fn g703_minute_degraded(errors: u32, seconds: u32, config: &TelemetryConfig) -> bool {
    u64::from(errors) * u64::from(config.g703_degraded_divisor) > u64::from(seconds)
}
