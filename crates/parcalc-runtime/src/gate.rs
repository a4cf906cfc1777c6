//! Free-worker gate
//!
//! Tracks which workers are not holding an assignment. The gate's count is
//! the number of free workers; acquiring from it does not just decrement a
//! counter, it hands back a specific index that was reserved while the
//! lock was held. This removes the window between "some worker is free"
//! and "worker i is free" that a bare counting semaphore leaves open.
//!
//! Indices come out lowest-first, matching a scan of workers `0..N`.

use std::collections::BTreeSet;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Lock-protected set of free worker indices
pub struct CountingGate {
    free: Mutex<BTreeSet<usize>>,
    available: Condvar,
}

impl CountingGate {
    /// Create a gate with workers `0..num_workers` all free
    pub fn new(num_workers: usize) -> Self {
        Self {
            free: Mutex::new((0..num_workers).collect()),
            available: Condvar::new(),
        }
    }

    // The set is never left half-updated, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, BTreeSet<usize>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return `index` to the free set.
    ///
    /// `publish` runs while the lock is held, after the index is inserted,
    /// so anyone who observes its effect also finds the index in the set.
    pub fn release_with<F: FnOnce()>(&self, index: usize, publish: F) {
        {
            let mut free = self.lock();
            let inserted = free.insert(index);
            debug_assert!(inserted, "worker {} released twice", index);
            publish();
        }
        self.available.notify_one();
    }

    /// Block until a free worker can be reserved and return its index.
    ///
    /// Candidates are tried lowest-first. `reserve` runs under the lock and
    /// must return `true` if it claimed the worker; a candidate it refuses
    /// has already been claimed elsewhere and is dropped from the set.
    pub fn acquire_with<F: FnMut(usize) -> bool>(&self, mut reserve: F) -> usize {
        let mut free = self.lock();
        loop {
            while let Some(index) = free.pop_first() {
                if reserve(index) {
                    return index;
                }
                log::trace!("skipping stale free entry for worker {}", index);
            }
            free = self
                .available
                .wait(free)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remove `index` from the free set.
    ///
    /// Returns `false` if it was not there.
    pub fn remove(&self, index: usize) -> bool {
        self.lock().remove(&index)
    }

    /// Number of free workers (snapshot, for diagnostics only)
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Whether `index` is currently in the free set (snapshot)
    #[cfg(test)]
    fn contains(&self, index: usize) -> bool {
        self.lock().contains(&index)
    }
}
