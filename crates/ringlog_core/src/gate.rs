//! Interruptible mutual-exclusion gate.
//!
//! Every device operation runs under one gate. Waiting for the gate blocks
//! the calling thread but can be cancelled by raising the caller's
//! [`Interrupt`], in which case the operation fails with
//! [`RingError::Interrupted`] before touching any shared state.

use crate::error::{RingError, RingResult};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A cancellation flag for blocked gate acquisition.
///
/// Cloning yields a handle to the same flag, so a signal handler or
/// supervising thread can hold one clone while the session holds another.
/// A raised interrupt is consumed by the acquisition it cancels.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    /// Creates a new, lowered interrupt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the interrupt.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Returns true if the interrupt is raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Lowers the interrupt, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }
}

/// A mutex whose acquisition can be interrupted.
#[derive(Debug)]
pub struct Gate<T> {
    inner: Mutex<T>,
    poll_interval: Duration,
}

impl<T> Gate<T> {
    /// Creates a gate guarding `value`.
    pub fn new(value: T, poll_interval: Duration) -> Self {
        Self {
            inner: Mutex::new(value),
            poll_interval,
        }
    }

    /// Acquires the gate, blocking until it is available.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if `interrupt` is raised before
    /// the gate is obtained. The interrupt is lowered.
    pub fn enter(&self, interrupt: &Interrupt) -> RingResult<MutexGuard<'_, T>> {
        loop {
            if interrupt.take() {
                return Err(RingError::Interrupted);
            }
            if let Some(guard) = self.inner.try_lock_for(self.poll_interval) {
                return Ok(guard);
            }
        }
    }

    /// Consumes the gate and returns the guarded value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}
