//! Line-interface and modem-signal sampling.
//!
//! These are the only places where raw line-status bits are read. Everything
//! above this layer works with [`LineSample`] and [`ModemSignals`].

use crate::hal::RegisterSpace;
use crate::internal::register::channel::{self, MODEM_CD, MODEM_CTS, MODEM_STATUS};
use crate::internal::register::line::{
    LINE_BPV, LINE_CRC, LINE_EBIT, LINE_FAS, LINE_LATCH, LINE_LATCH_COUNTERS, LINE_SR, reg,
};
use crate::telemetry::{LineAlarms, LineSample};

/// Carrier and CTS levels of a channel's modem port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModemSignals {
    /// Data Carrier Detect asserted
    pub carrier: bool,
    /// Clear To Send asserted
    pub cts: bool,
}

impl ModemSignals {
    /// Decode the modem status register
    #[inline]
    pub fn from_raw(status: u8) -> Self {
        Self {
            carrier: (status & MODEM_CD) != 0,
            cts: (status & MODEM_CTS) != 0,
        }
    }

    /// Read the current levels of `channel`
    pub fn read<R: RegisterSpace>(regs: &mut R, channel: usize) -> Self {
        Self::from_raw(regs.read_u8(channel::reg(channel, MODEM_STATUS)))
    }
}

/// One channel's E1 / G.703 line interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInterface {
    channel: usize,
}

impl LineInterface {
    /// Bind to the line interface of `channel`
    #[must_use]
    pub const fn new(channel: usize) -> Self {
        Self { channel }
    }

    /// Latch the error counters for the elapsed second and read them
    /// together with the current alarm state.
    pub fn sample<R: RegisterSpace>(&self, regs: &mut R) -> LineSample {
        let ch = self.channel;
        regs.write_u8(reg(ch, LINE_LATCH), LINE_LATCH_COUNTERS);

        LineSample {
            alarms: LineAlarms::from_raw(regs.read_u8(reg(ch, LINE_SR))),
            bipolar_violations: u32::from(regs.read_u16(reg(ch, LINE_BPV))),
            crc_errors: u32::from(regs.read_u16(reg(ch, LINE_CRC))),
            frame_sync_errors: u32::from(regs.read_u16(reg(ch, LINE_FAS))),
            remote_crc_errors: u32::from(regs.read_u16(reg(ch, LINE_EBIT))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::line::{LINE_SR_AIS, LINE_SR_SLIP};
    use crate::testing::MockRegisterSpace;

    #[test]
    fn modem_signals_decode() {
        assert_eq!(ModemSignals::from_raw(0), ModemSignals::default());
        let both = ModemSignals::from_raw(MODEM_CD | MODEM_CTS);
        assert!(both.carrier && both.cts);
        let cts_only = ModemSignals::from_raw(MODEM_CTS);
        assert!(!cts_only.carrier && cts_only.cts);
    }

    #[test]
    fn modem_signals_read_from_channel_block() {
        let mut hw = MockRegisterSpace::new();
        hw.set_modem(1, true, false);
        let signals = ModemSignals::read(&mut hw, 1);
        assert!(signals.carrier);
        assert!(!signals.cts);
        assert_eq!(ModemSignals::read(&mut hw, 0), ModemSignals::default());
    }

    #[test]
    fn sample_latches_before_reading() {
        let mut hw = MockRegisterSpace::new();
        hw.set_line_status(0, LINE_SR_AIS | LINE_SR_SLIP);
        hw.set_line_counters(0, 5, 6, 7, 8);

        let sample = LineInterface::new(0).sample(&mut hw);

        assert_eq!(hw.writes().first(), Some(&(reg(0, LINE_LATCH), LINE_LATCH_COUNTERS as u16)));
        assert!(sample.alarms.ais);
        assert!(sample.alarms.slip);
        assert!(!sample.alarms.los);
        assert_eq!(sample.bipolar_violations, 5);
        assert_eq!(sample.crc_errors, 6);
        assert_eq!(sample.frame_sync_errors, 7);
        assert_eq!(sample.remote_crc_errors, 8);
    }

    #[test]
    fn counters_clear_on_read_for_board_mock() {
        let mut hw = MockRegisterSpace::for_board(1);
        hw.set_line_counters(0, 3, 0, 0, 0);
        let line = LineInterface::new(0);

        assert_eq!(line.sample(&mut hw).bipolar_violations, 3);
        assert_eq!(line.sample(&mut hw).bipolar_violations, 0);
    }
}
