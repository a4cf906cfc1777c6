//! Portable signal using std::sync::Condvar
//!
//! Used on platforms without futex support, or everywhere with the
//! `portable-signal` feature.

use super::Signal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Condvar-based signal
pub struct CondvarSignal {
    /// true = available
    state: Mutex<bool>,

    condvar: Condvar,

    /// Threads blocked in `acquire()`
    waiters: AtomicUsize,
}

impl CondvarSignal {
    /// Create a signal, initially available or taken
    pub fn new(available: bool) -> Self {
        Self {
            state: Mutex::new(available),
            condvar: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    // The guarded bool is always valid, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CondvarSignal {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Signal for CondvarSignal {
    fn acquire(&self) {
        let mut guard = self.lock();
        while !*guard {
            self.waiters.fetch_add(1, Ordering::SeqCst);
            guard = self
                .condvar
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
            self.waiters.fetch_sub(1, Ordering::SeqCst);
        }
        *guard = false;
    }

    fn try_acquire(&self) -> bool {
        let mut guard = self.lock();
        if *guard {
            *guard = false;
            true
        } else {
            false
        }
    }

    fn release(&self) {
        {
            let mut guard = self.lock();
            *guard = true;
        }
        self.condvar.notify_one();
    }

    fn is_available(&self) -> bool {
        *self.lock()
    }

    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}
