//! Dispatcher/worker synchronization group
//!
//! Every worker `i` owns two binary signals:
//!
//! - **Ready(i)**: raised by the dispatcher once it has written work into
//!   the slot; consumed by the worker when it wakes. Starts taken.
//! - **Busy(i)**: held from the moment the dispatcher reserves the worker
//!   until the worker has published its result. Starts available.
//!
//! Plus one shared [`CountingGate`] holding the indices of free workers.
//! `i` is in the gate exactly when Busy(i) is available; both are updated
//! together under the gate's lock.
//!
//! ```text
//!  Dispatcher                              Worker i
//!  ----------                              --------
//!  reserve_specific(i) / acquire_any_free()
//!    (Busy(i) taken, i leaves the gate)
//!  harvest previous result, write slot
//!  signal_ready(i)  ------------------->   wait_ready(i)
//!                                          read slot, compute, write result
//!                   <-------------------   clear_busy_and_release(i)
//!                                            (Busy(i) available, i rejoins the gate)
//! ```
//!
//! Methods panic if `i` is not a valid worker index.

use parcalc_core::error::{SimError, SimResult};
use crate::gate::CountingGate;
use crate::signal::{PlatformSignal, Signal};

/// The Ready/Busy pair for one worker
pub struct WorkerSignals {
    pub ready: PlatformSignal,
    pub busy: PlatformSignal,
}

impl WorkerSignals {
    fn new() -> Self {
        Self {
            ready: PlatformSignal::new(false),
            busy: PlatformSignal::new(true),
        }
    }
}

/// Named synchronization handles for a fixed pool of workers
pub struct SyncGroup {
    lanes: Box<[WorkerSignals]>,
    free: CountingGate,
}

impl SyncGroup {
    /// Create signals for `num_workers` workers, all initially free.
    ///
    /// Fails if the pool would be empty or larger than `max_workers`.
    pub fn new(num_workers: usize, max_workers: usize) -> SimResult<Self> {
        if num_workers == 0 {
            return Err(SimError::InvalidWorkerCount { value: 0 });
        }
        if num_workers > max_workers {
            return Err(SimError::TooManyWorkers {
                requested: num_workers,
                max: max_workers,
            });
        }

        let lanes = (0..num_workers).map(|_| WorkerSignals::new()).collect();
        Ok(Self {
            lanes,
            free: CountingGate::new(num_workers),
        })
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.lanes.len()
    }

    /// Signals of worker `i`
    #[inline]
    pub fn lane(&self, i: usize) -> &WorkerSignals {
        &self.lanes[i]
    }

    /// Block until Busy(i) is clear, then mark it held.
    ///
    /// Does not touch the free gate; see [`SyncGroup::reserve_specific`].
    pub fn assign_wait_then_mark_busy(&self, i: usize) {
        self.lanes[i].busy.acquire();
    }

    /// Reserve worker `i` for the dispatcher: wait for it to be free, mark
    /// it busy and take it out of the free gate.
    pub fn reserve_specific(&self, i: usize) {
        self.assign_wait_then_mark_busy(i);
        // Absent only if an any-free reservation already dropped it as stale
        self.free.remove(i);
    }

    /// Reserve the lowest-index free worker, blocking while none is free.
    ///
    /// The returned worker's Busy signal is already held by the caller.
    pub fn acquire_any_free(&self) -> usize {
        self.free
            .acquire_with(|i| self.lanes[i].busy.try_acquire())
    }

    /// Wake worker `i` to consume its slot
    pub fn signal_ready(&self, i: usize) {
        self.lanes[i].ready.release();
    }

    /// Worker side: block until the dispatcher has signalled, consuming the signal
    pub fn wait_ready(&self, i: usize) {
        self.lanes[i].ready.acquire();
    }

    /// Worker side: clear Busy(i) and put `i` back into the free gate
    pub fn clear_busy_and_release(&self, i: usize) {
        let lane = &self.lanes[i];
        self.free.release_with(i, || lane.busy.release());
    }

    /// Non-blocking test of whether Busy(i) is clear
    pub fn probe_is_free(&self, i: usize) -> bool {
        self.lanes[i].busy.is_available()
    }

    /// Number of free workers (snapshot, for diagnostics only)
    pub fn free_count(&self) -> usize {
        self.free.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_setup_errors() {
        assert!(matches!(
            SyncGroup::new(0, 8),
            Err(SimError::InvalidWorkerCount { value: 0 })
        ));
        assert!(matches!(
            SyncGroup::new(9, 8),
            Err(SimError::TooManyWorkers { requested: 9, max: 8 })
        ));
    }

    #[test]
    fn test_initial_state() {
        let sync = SyncGroup::new(3, 8).unwrap();
        assert_eq!(sync.num_workers(), 3);
        assert_eq!(sync.free_count(), 3);
        assert!((0..3).all(|i| sync.probe_is_free(i)));
        assert!((0..3).all(|i| !sync.lane(i).ready.is_available()));
    }

    #[test]
    fn test_free_count_tracks_busy() {
        let sync = SyncGroup::new(3, 8).unwrap();

        sync.reserve_specific(1);
        assert!(!sync.probe_is_free(1));
        assert_eq!(sync.free_count(), 2);

        // Any-free skips the reserved worker and picks the lowest free one
        assert_eq!(sync.acquire_any_free(), 0);
        assert_eq!(sync.acquire_any_free(), 2);
        assert_eq!(sync.free_count(), 0);

        sync.clear_busy_and_release(1);
        assert!(sync.probe_is_free(1));
        assert_eq!(sync.free_count(), 1);
        assert_eq!(sync.acquire_any_free(), 1);
    }

    #[test]
    fn test_reserve_blocks_until_worker_releases() {
        let sync = Arc::new(SyncGroup::new(1, 8).unwrap());
        sync.reserve_specific(0);
        sync.signal_ready(0);

        let worker = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || {
                sync.wait_ready(0);
                thread::sleep(Duration::from_millis(50));
                sync.clear_busy_and_release(0);
            })
        };

        // Blocks until the worker clears Busy(0)
        sync.reserve_specific(0);
        assert!(!sync.probe_is_free(0));
        assert_eq!(sync.free_count(), 0);
        worker.join().unwrap();
    }

    #[test]
    fn test_any_free_waits_for_release() {
        let sync = Arc::new(SyncGroup::new(2, 8).unwrap());
        sync.reserve_specific(0);
        sync.reserve_specific(1);

        let releaser = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                sync.clear_busy_and_release(1);
            })
        };

        assert_eq!(sync.acquire_any_free(), 1);
        releaser.join().unwrap();
    }
}
