//! Locked holder for a stack shared with an interrupt handler.

use lark_driver_traits::NicDevice;
use spin::Mutex;

use crate::stack::NetStack;

/// A [`NetStack`] slot shared between program-level callers and the
/// device interrupt handler, usable as a `static`.
///
/// The interrupt handler takes the lock on every receive interrupt,
/// so program-level callers must hold it only with that interrupt
/// masked; a handler spinning on a preempted holder never returns.
pub struct SharedStack<D: NicDevice> {
    inner: Mutex<Option<NetStack<D>>>,
}

impl<D: NicDevice> SharedStack<D> {
    pub const fn new() -> SharedStack<D> {
        SharedStack {
            inner: Mutex::new(None),
        }
    }

    /// Installs a stack, returning any previous occupant.
    pub fn install(&self, stack: NetStack<D>) -> Option<NetStack<D>> {
        self.inner.lock().replace(stack)
    }

    /// Removes and returns the installed stack.
    pub fn take(&self) -> Option<NetStack<D>> {
        self.inner.lock().take()
    }

    /// Runs `f` on the installed stack. Returns `None` when nothing
    /// is installed.
    pub fn with<R>(&self, f: impl FnOnce(&mut NetStack<D>) -> R) -> Option<R> {
        self.inner.lock().as_mut().map(f)
    }

    /// Non-blocking variant for interrupt context; bails out instead
    /// of spinning when the lock is already held.
    pub fn try_with<R>(&self, f: impl FnOnce(&mut NetStack<D>) -> R) -> Option<R> {
        let mut guard = self.inner.try_lock()?;
        guard.as_mut().map(f)
    }
}
