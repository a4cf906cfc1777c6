//! Binary signals
//!
//! A `Signal` is a binary semaphore: it is either *available* or *taken*.
//! `acquire()` is a single combined "wait until available, then take"
//! operation, so no observer can see the gap between the wait and the take.
//! `release()` makes it available again and wakes one waiter.
//!
//! Platform-specific implementations put waiters to sleep in the kernel;
//! nothing here busy-waits.

/// Binary semaphore used for the per-worker Ready and Busy handshake
pub trait Signal: Send + Sync {
    /// Block until the signal is available, then take it
    fn acquire(&self);

    /// Take the signal if it is available, without blocking
    ///
    /// Returns `true` if the caller now holds it.
    fn try_acquire(&self) -> bool;

    /// Make the signal available and wake one waiter
    ///
    /// Releasing an already-available signal leaves it available (binary,
    /// not counting).
    fn release(&self);

    /// Non-blocking probe (hint, may be stale by the time it is used)
    fn is_available(&self) -> bool;

    /// Number of threads currently blocked in `acquire()` (hint)
    #[cfg(test)]
    fn waiter_count(&self) -> usize;
}

mod condvar;
pub use condvar::CondvarSignal;

// Platform-specific implementations
cfg_if::cfg_if! {
    if #[cfg(all(target_os = "linux", not(feature = "portable-signal")))] {
        mod futex_linux;
        pub use futex_linux::FutexSignal as PlatformSignal;
    } else {
        pub use condvar::CondvarSignal as PlatformSignal;
    }
}
