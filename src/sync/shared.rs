//! ISR-safe board wrapper using critical sections.
//!
//! Provides [`SharedBoard`], the board plus its hook table behind one lock.

use super::primitives::CriticalSectionCell;
use crate::driver::board::Board;
use crate::driver::config::Direction;
use crate::driver::error::{ConfigResult, SendResult};
use crate::driver::events::{
    CompletionBatch, ErrorHook, FrameTag, Hooks, ModemHook, ReceiveHook, TransmitHook,
};
use crate::hal::RegisterSpace;
use crate::internal::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CHANNELS, DEFAULT_RING_SIZE, MAX_CHANNELS,
};

/// ISR-safe board wrapper using critical sections.
///
/// Ring, counter and telemetry state is only touched with the lock held.
/// Hooks are called after it has been released, so a hook may call
/// [`SharedBoard::send`] (or anything else on the board) without
/// deadlocking.
///
/// # Stack Usage
///
/// [`SharedBoard::handle_interrupt`] builds one [`CompletionBatch`] per
/// pending channel on the stack of the interrupt context: `N` payload copies
/// of `BUF_SIZE` bytes plus `N` small records per direction. With the default
/// geometry (`N = 4`, `BUF_SIZE = 1600`) that is about 6.5 KB; size the
/// interrupt stack for it, or shrink `N` / `BUF_SIZE`.
///
/// # Example
///
/// ```ignore
/// static BOARD: SharedBoard<'static, Mmio, 2, 4, 1600> = SharedBoard::new(Mmio::new());
///
/// static ON_RX: fn(usize, &[u8]) = |channel, frame| { /* ... */ };
/// BOARD.on_receive(Some(&ON_RX));
///
/// BOARD.send(0, &frame, FrameTag(1)).ok();
/// ```
pub struct SharedBoard<
    'h,
    R: RegisterSpace,
    const CHANNELS: usize,
    const N: usize,
    const BUF_SIZE: usize,
> {
    board: CriticalSectionCell<Board<R, CHANNELS, N, BUF_SIZE>>,
    hooks: CriticalSectionCell<Hooks<'h>>,
}

impl<'h, R: RegisterSpace, const CHANNELS: usize, const N: usize, const BUF_SIZE: usize>
    SharedBoard<'h, R, CHANNELS, N, BUF_SIZE>
{
    /// Create a new shared board (const, suitable for static initialization).
    pub const fn new(regs: R) -> Self {
        Self {
            board: CriticalSectionCell::new(Board::new(regs)),
            hooks: CriticalSectionCell::new(Hooks::new()),
        }
    }

    /// Execute a closure with exclusive access to the board.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut Board<R, CHANNELS, N, BUF_SIZE>) -> T,
    {
        self.board.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut Board<R, CHANNELS, N, BUF_SIZE>) -> T,
    {
        self.board.try_with(f)
    }

    // =========================================================================
    // Hook Registration
    // =========================================================================

    /// Replace the whole hook table
    pub fn set_hooks(&self, hooks: Hooks<'h>) {
        self.hooks.replace(hooks);
    }

    /// Replace the receive hook; `None` restores the no-op
    pub fn on_receive(&self, hook: Option<ReceiveHook<'h>>) {
        self.hooks.with(|hooks| hooks.on_receive = hook);
    }

    /// Replace the transmit-done hook; `None` restores the no-op
    pub fn on_transmit_done(&self, hook: Option<TransmitHook<'h>>) {
        self.hooks.with(|hooks| hooks.on_transmit_done = hook);
    }

    /// Replace the error hook; `None` restores the no-op
    pub fn on_error(&self, hook: Option<ErrorHook<'h>>) {
        self.hooks.with(|hooks| hooks.on_error = hook);
    }

    /// Replace the modem-change hook; `None` restores the no-op
    pub fn on_modem_change(&self, hook: Option<ModemHook<'h>>) {
        self.hooks.with(|hooks| hooks.on_modem_change = hook);
    }

    // =========================================================================
    // Entry Points
    // =========================================================================

    /// Completion-signal entry point.
    ///
    /// Each pending channel is serviced under the lock into a
    /// [`CompletionBatch`], which is then delivered to the hooks with the
    /// lock released. Returns the pending-channel mask that was serviced.
    ///
    /// The batch lives on the caller's stack and holds `N` copies of a
    /// `BUF_SIZE` buffer (see [Stack Usage](SharedBoard#stack-usage)).
    pub fn handle_interrupt(&self) -> u8 {
        let pending = self.board.with(|board| board.take_pending());
        for channel in 0..CHANNELS.min(MAX_CHANNELS) {
            if pending & (1 << channel) == 0 {
                continue;
            }
            let mut batch = CompletionBatch::<N, BUF_SIZE>::new(channel);
            let serviced = self
                .board
                .with(|board| board.service_channel(channel, &mut batch));
            if serviced.is_ok() && !batch.is_empty() {
                let mut hooks = self.hooks.get();
                batch.dispatch(&mut hooks);
            }
        }
        pending
    }

    /// One-second tick entry point
    pub fn tick(&self) {
        self.board.with(|board| board.tick());
    }

    /// Queue a frame for transmission. See [`Board::send`].
    pub fn send(&self, channel: usize, data: &[u8], tag: FrameTag) -> SendResult<()> {
        self.board.with(|board| board.send(channel, data, tag))
    }

    /// Slots that can still be armed. See [`Board::free_slots`].
    pub fn free_slots(&self, channel: usize, direction: Direction) -> ConfigResult<usize> {
        self.board.with(|board| board.free_slots(channel, direction))
    }
}

/// Shared board with the default geometry
pub type SharedBoardDefault<'h, R> =
    SharedBoard<'h, R, DEFAULT_CHANNELS, DEFAULT_RING_SIZE, DEFAULT_BUFFER_SIZE>;
