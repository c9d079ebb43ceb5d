#![forbid(unsafe_code)]

//! Reentrancy guard for stack entry points.
//!
//! A [`BusyFlag`] is owned by a stack. Every entry point acquires a
//! [`BusyGuard`] before touching a command and holds it until the call
//! returns. The flag is cleared in `Drop`, so it is released on every exit
//! path, including when a command panics and the stack unwinds.
//!
//! Acquiring an already-set flag is a caller bug (a command calling back into
//! the stack that is running it). It panics instead of returning an error so
//! that generic error handling cannot swallow it.

use std::cell::Cell;

/// Busy state of one stack instance.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: Cell<bool>,
    operation: Cell<&'static str>,
}

impl BusyFlag {
    /// Create a flag in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an operation currently holds the flag.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Mark the flag busy for `operation` until the returned guard drops.
    ///
    /// # Panics
    ///
    /// Panics if the flag is already held.
    #[must_use = "the flag is released as soon as the guard is dropped"]
    pub fn acquire(&self, operation: &'static str) -> BusyGuard<'_> {
        if self.busy.get() {
            panic!(
                "reentrant call to {operation} while {} is in progress on the same stack",
                self.operation.get()
            );
        }
        self.busy.set(true);
        self.operation.set(operation);
        BusyGuard { flag: self }
    }
}

/// RAII guard that keeps a [`BusyFlag`] set.
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl BusyGuard<'_> {
    /// Name of the operation holding the flag.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.flag.operation.get()
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.set(false);
        self.flag.operation.set("");
    }
}

impl std::fmt::Debug for BusyGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyGuard")
            .field("operation", &self.operation())
            .finish()
    }
}
