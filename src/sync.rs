//! Guarded shared cells.
//!
//! Every entity that crosses task boundaries (the sensor cache, the vision
//! monitor, each actuator) lives in a [`Guarded`] cell.  The lock is held
//! only for the duration of the closure or copy; callers never get a
//! guard back, so nothing can hold two entity locks at once by accident.
//!
//! A poisoned lock is recovered rather than propagated: a panic in one
//! control loop must not take the other loops down with it.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single-writer / multi-reader cell around one owned value.
#[derive(Debug, Default)]
pub struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Run `f` against the value under the lock and return its result.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    /// Read-only access under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Copy> Guarded<T> {
    /// Atomic copy-out of the whole value.
    pub fn get(&self) -> T {
        *self.lock()
    }

    /// Atomic wholesale replacement.
    pub fn set(&self, value: T) {
        *self.lock() = value;
    }
}
