//! Lock cell shared by the interrupt handler, the tick and control-plane
//! calls.
//!
//! [`SharedBoard`](super::SharedBoard) keeps two of these: one around the
//! board, one around its hook table.

use core::cell::RefCell;
use critical_section::Mutex;

/// Value guarded by a critical section.
///
/// The lock is not re-entrant: reaching the same cell again from inside
/// [`Self::with`] panics, from inside [`Self::try_with`] yields `None`.
/// `Sync` follows from `critical_section::Mutex` whenever `T: Send`.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Const constructor, usable in a `static`.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` on the value with interrupts masked.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Like [`Self::with`], but `None` when the value is already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow(cs).try_borrow_mut().ok()?;
            Some(f(&mut value))
        })
    }

    /// Swap in `value`, returning the previous one.
    #[inline]
    pub fn replace(&self, value: T) -> T {
        critical_section::with(|cs| self.inner.borrow(cs).replace(value))
    }
}

impl<T: Copy> CriticalSectionCell<T> {
    /// Snapshot of the value; the lock is released on return.
    #[inline]
    pub fn get(&self) -> T {
        critical_section::with(|cs| *self.inner.borrow_ref(cs))
    }
}
