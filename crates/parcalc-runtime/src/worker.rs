//! Worker threads
//!
//! Each worker runs a [`WorkerLoop`] on its own OS thread. The loop holds
//! only its index and a shared handle to the mailboxes; everything it
//! needs is built before the thread starts.
//!
//! ```text
//! WaitingForWork --wait_ready--> Computing --> PublishingResult --> WaitingForWork
//!                                    |
//!                                    +-- termination marker --> Terminated
//! ```

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use parcalc_core::error::{SimError, SimResult};
use parcalc_core::op::Outcome;
use parcalc_core::slot::Command;
use crate::config::{defaults, SimConfig};
use crate::mailbox::Mailboxes;

/// Where a worker is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    WaitingForWork,
    Computing,
    PublishingResult,
    Terminated,
}

/// What a worker did before it exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub index: usize,
    /// Assignments computed (failed ones included)
    pub computed: u64,
}

/// One worker's accept/compute/publish loop
pub struct WorkerLoop {
    index: usize,
    mailboxes: Arc<Mailboxes>,
    compute_delay: Duration,
    phase: WorkerPhase,
    computed: u64,
}

impl WorkerLoop {
    pub fn new(index: usize, mailboxes: Arc<Mailboxes>, compute_delay: Duration) -> Self {
        Self {
            index,
            mailboxes,
            compute_delay,
            phase: WorkerPhase::WaitingForWork,
            computed: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> WorkerPhase {
        self.phase
    }

    /// Run until the termination marker arrives
    pub fn run(mut self) -> WorkerReport {
        log::debug!("worker {} started", self.index);
        while self.step() != WorkerPhase::Terminated {}

        WorkerReport {
            index: self.index,
            computed: self.computed,
        }
    }

    /// Handle exactly one assignment.
    ///
    /// Blocks until the dispatcher posts something, then returns the phase
    /// the worker ends up in: `WaitingForWork` after publishing a result, or
    /// `Terminated`.
    pub fn step(&mut self) -> WorkerPhase {
        self.phase = WorkerPhase::WaitingForWork;
        let lease = self.mailboxes.wait_assignment(self.index);
        self.phase = WorkerPhase::Computing;

        let slot = lease.slot();
        let (lhs, rhs, command) = (slot.operand1, slot.operand2, slot.command);
        if let Some(command) = command {
            log::trace!("worker {} woken for '{}'", self.index, command);
        }
        match command {
            Some(Command::Terminate) => {
                log::info!(
                    "worker {} terminating after {} computations",
                    self.index,
                    self.computed
                );
                lease.retire();
                self.phase = WorkerPhase::Terminated;
            }
            Some(Command::Compute(op)) => {
                if !self.compute_delay.is_zero() {
                    thread::sleep(self.compute_delay);
                }

                let outcome: Outcome = op.apply(lhs, rhs).into();
                match outcome {
                    Outcome::Value(v) => {
                        log::debug!("worker {} computed {}{}{}={}", self.index, lhs, op, rhs, v)
                    }
                    Outcome::Failed(e) => {
                        log::warn!("worker {} failed {}{}{}: {}", self.index, lhs, op, rhs, e)
                    }
                }

                self.phase = WorkerPhase::PublishingResult;
                lease.complete(outcome);
                self.computed += 1;
                self.phase = WorkerPhase::WaitingForWork;
            }
            // Ready is only raised by SlotGrant::assign / terminate, which write a command first
            None => {
                log::debug!("worker {} woken with an empty slot", self.index);
                unreachable!("worker {} woken with an empty slot", self.index);
            }
        }
        self.phase
    }
}

/// The fixed set of worker threads for one run
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerPool {
    /// Start one thread per mailbox.
    ///
    /// If a thread cannot be spawned, the workers already running are sent
    /// the termination marker and joined before the error is returned.
    pub fn spawn(mailboxes: &Arc<Mailboxes>, config: &SimConfig) -> SimResult<Self> {
        let stack_size = config.worker_stack_size;
        Self::spawn_with(mailboxes, config, |index, worker| {
            thread::Builder::new()
                .name(format!("{}-{}", defaults::THREAD_NAME_PREFIX, index))
                .stack_size(stack_size)
                .spawn(move || worker.run())
        })
    }

    /// Like [`WorkerPool::spawn`], with thread creation done by `spawn_one`
    fn spawn_with<F>(
        mailboxes: &Arc<Mailboxes>,
        config: &SimConfig,
        mut spawn_one: F,
    ) -> SimResult<Self>
    where
        F: FnMut(usize, WorkerLoop) -> io::Result<JoinHandle<WorkerReport>>,
    {
        let num_workers = mailboxes.num_workers();
        let mut handles = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let worker = WorkerLoop::new(index, Arc::clone(mailboxes), config.compute_delay);
            match spawn_one(index, worker) {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    log::error!("failed to spawn worker {}: {}", index, source);
                    for started in 0..handles.len() {
                        mailboxes.grant_specific(started).terminate();
                    }
                    for (started, handle) in handles.into_iter().enumerate() {
                        if handle.join().is_err() {
                            log::warn!("teardown: {}", SimError::WorkerPanicked { index: started });
                        }
                    }
                    return Err(SimError::Spawn { index, source });
                }
            }
        }

        log::info!("started {} workers", num_workers);
        Ok(WorkerPool { handles })
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker thread to exit.
    ///
    /// Every worker must already have been sent the termination marker.
    /// Panicked workers are returned as teardown errors rather than
    /// aborting the join.
    pub fn join(self) -> (Vec<WorkerReport>, Vec<SimError>) {
        let mut reports = Vec::with_capacity(self.handles.len());
        let mut errors = Vec::new();

        for (index, handle) in self.handles.into_iter().enumerate() {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => errors.push(SimError::WorkerPanicked { index }),
            }
        }
        (reports, errors)
    }
}
