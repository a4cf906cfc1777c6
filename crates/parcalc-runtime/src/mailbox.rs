//! Per-worker mailboxes and the capability tokens that guard them
//!
//! Each worker has one [`SharedSlot`]. Nobody touches a slot directly:
//!
//! - The dispatcher gets a [`SlotGrant`] by reserving a worker. The grant
//!   exists only while Busy(i) is held and before Ready(i) is raised, and is
//!   consumed by [`SlotGrant::assign`] or [`SlotGrant::terminate`], which
//!   raise Ready(i).
//! - The worker gets a [`WorkerLease`] by waiting on Ready(i). The lease is
//!   consumed by [`WorkerLease::complete`], which clears Busy(i).
//!
//! A grant for `i` needs Busy(i) available, and Busy(i) only becomes
//! available when the lease for `i` is consumed; a lease for `i` needs
//! Ready(i), which is only raised when the grant for `i` is consumed. So
//! a grant and a lease for the same slot never exist at the same time.

use core::cell::UnsafeCell;
use parcalc_core::error::SimResult;
use parcalc_core::record::ResultRecord;
use parcalc_core::slot::SlotState;
use parcalc_core::ticket::WorkTicket;
use parcalc_core::op::Outcome;
use crate::sync::SyncGroup;

/// Single-buffered mailbox for one worker
///
/// Access is serialized by the Ready/Busy handshake, not by a lock.
pub struct SharedSlot {
    state: UnsafeCell<SlotState>,
}

// Safety: the slot is only reached through SlotGrant / WorkerLease, and the
// handshake guarantees at most one of them exists per slot at any time.
unsafe impl Sync for SharedSlot {}

impl SharedSlot {
    fn new() -> Self {
        Self {
            state: UnsafeCell::new(SlotState::new()),
        }
    }

    /// # Safety
    ///
    /// Caller must hold the slot's grant or lease.
    #[inline]
    unsafe fn get(&self) -> &SlotState {
        &*self.state.get()
    }

    /// # Safety
    ///
    /// Caller must hold the slot's grant or lease.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    unsafe fn get_mut(&self) -> &mut SlotState {
        &mut *self.state.get()
    }
}

/// All slots of a pool together with their synchronization group
pub struct Mailboxes {
    slots: Box<[SharedSlot]>,
    sync: SyncGroup,
}

impl Mailboxes {
    /// Allocate slots and signals for `num_workers` workers
    pub fn new(num_workers: usize, max_workers: usize) -> SimResult<Self> {
        let sync = SyncGroup::new(num_workers, max_workers)?;
        let slots = (0..num_workers).map(|_| SharedSlot::new()).collect();
        Ok(Self { slots, sync })
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.slots.len()
    }

    /// Dispatcher: wait for worker `i` to be free and reserve it
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a valid worker index.
    pub fn grant_specific(&self, i: usize) -> SlotGrant<'_> {
        self.sync.reserve_specific(i);
        SlotGrant::new(self, i)
    }

    /// Dispatcher: wait for any worker to be free and reserve the lowest one
    pub fn grant_any_free(&self) -> SlotGrant<'_> {
        let i = self.sync.acquire_any_free();
        SlotGrant::new(self, i)
    }

    /// Worker: block until the dispatcher has posted something for `i`
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a valid worker index.
    pub fn wait_assignment(&self, i: usize) -> WorkerLease<'_> {
        self.sync.wait_ready(i);
        WorkerLease { mailboxes: self, index: i }
    }

    /// Whether worker `i` currently holds no assignment (hint)
    pub fn probe_is_free(&self, i: usize) -> bool {
        self.sync.probe_is_free(i)
    }

    /// Number of free workers (snapshot, for diagnostics only)
    pub fn free_count(&self) -> usize {
        self.sync.free_count()
    }
}

/// Dispatcher's exclusive access to one reserved slot
///
/// Dropping a grant without assigning anything returns the worker to the
/// free pool untouched.
pub struct SlotGrant<'a> {
    mailboxes: &'a Mailboxes,
    index: usize,
    armed: bool,
}

impl<'a> SlotGrant<'a> {
    fn new(mailboxes: &'a Mailboxes, index: usize) -> Self {
        Self { mailboxes, index, armed: true }
    }

    /// Index of the reserved worker
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slot(&self) -> &SlotState {
        // Safety: we hold the grant
        unsafe { self.mailboxes.slots[self.index].get() }
    }

    fn slot_mut(&mut self) -> &mut SlotState {
        // Safety: we hold the grant
        unsafe { self.mailboxes.slots[self.index].get_mut() }
    }

    /// Claim the result left by the worker's previous assignment, if any
    pub fn take_unclaimed(&mut self) -> Option<ResultRecord> {
        let index = self.index;
        self.slot_mut().take_unclaimed(index)
    }

    /// Write a new assignment and wake the worker
    pub fn assign(mut self, ticket: &WorkTicket) {
        self.slot_mut().post(ticket);
        self.publish();
    }

    /// Write the termination marker and wake the worker
    pub fn terminate(mut self) {
        self.slot_mut().post_termination();
        self.publish();
    }

    fn publish(mut self) {
        self.armed = false;
        self.mailboxes.sync.signal_ready(self.index);
    }
}

impl Drop for SlotGrant<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::debug!("grant for worker {} dropped unused", self.index);
            self.mailboxes.sync.clear_busy_and_release(self.index);
        }
    }
}

/// Worker's exclusive access to its slot after being woken
///
/// Dropping a lease without completing it leaves the worker busy, so the
/// dispatcher will never reserve it again.
pub struct WorkerLease<'a> {
    mailboxes: &'a Mailboxes,
    index: usize,
}

impl<'a> WorkerLease<'a> {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slot(&self) -> &SlotState {
        // Safety: we hold the lease
        unsafe { self.mailboxes.slots[self.index].get() }
    }

    /// Publish `outcome`, clear Busy and rejoin the free pool
    pub fn complete(self, outcome: Outcome) {
        // Safety: we hold the lease
        let slot = unsafe { self.mailboxes.slots[self.index].get_mut() };
        slot.store_result(outcome);
        self.mailboxes.sync.clear_busy_and_release(self.index);
    }

    /// Stop for good: the worker stays busy and never rejoins the pool
    pub fn retire(self) {}
}
