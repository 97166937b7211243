//! Synchronization and Concurrency Support
//!
//! The board is reached from three contexts: the completion-signal
//! (interrupt) handler, the one-second tick and control-plane calls. This
//! module serializes them behind one critical-section lock.
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`], ISR-safe interior
//!   mutability
//! - **Shared Wrapper** (`shared`): [`SharedBoard`], the board plus its hook
//!   table; events are delivered after the lock is released
//!
//! # Example
//!
//! ```ignore
//! use ph_sync_serial::sync::SharedBoard;
//!
//! static BOARD: SharedBoard<'static, MmioRegisters, 2, 4, 1600> =
//!     SharedBoard::new(MmioRegisters::new(BASE));
//!
//! fn main() {
//!     BOARD.with(|board| {
//!         board.init(BoardConfig::new(), &IdentityMapping, &mut delay).unwrap();
//!         board.enable(0, Direction::Receive, true).unwrap();
//!     });
//! }
//!
//! #[interrupt]
//! fn SERIAL_IRQ() {
//!     BOARD.handle_interrupt();
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::{SharedBoard, SharedBoardDefault};
