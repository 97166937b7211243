//! Interrupt status handling for adapter channels.
//!
//! This module provides the [`InterruptStatus`] structure for parsing
//! and acknowledging a channel's interrupt status register.

use crate::internal::register::channel::{CHAN_ISR_MODEM, CHAN_ISR_RX_DMA, CHAN_ISR_TX_DMA};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from a channel's interrupt status register.
///
/// # Example
///
/// ```ignore
/// let status = InterruptStatus::from_raw(regs.read_u8(CHAN_ISR));
/// if status.rx_dma {
///     // Drain the receive ring
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// Receive DMA event - frames completed or a ring fault
    pub rx_dma: bool,
    /// Transmit DMA event - frames sent or an underrun
    pub tx_dma: bool,
    /// Modem signal change - carrier or CTS transition
    pub modem_change: bool,
}

impl InterruptStatus {
    /// Create from raw channel interrupt status register value
    #[inline]
    pub fn from_raw(status: u8) -> Self {
        Self {
            rx_dma: (status & CHAN_ISR_RX_DMA) != 0,
            tx_dma: (status & CHAN_ISR_TX_DMA) != 0,
            modem_change: (status & CHAN_ISR_MODEM) != 0,
        }
    }

    /// Convert to raw value for clearing (write-1-to-clear)
    #[inline]
    pub fn to_raw(&self) -> u8 {
        let mut val = 0u8;
        if self.rx_dma {
            val |= CHAN_ISR_RX_DMA;
        }
        if self.tx_dma {
            val |= CHAN_ISR_TX_DMA;
        }
        if self.modem_change {
            val |= CHAN_ISR_MODEM;
        }
        val
    }

    /// Check if any interrupt occurred
    #[inline]
    pub fn any(&self) -> bool {
        self.rx_dma || self.tx_dma || self.modem_change
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
