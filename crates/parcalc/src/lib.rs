//! # parcalc - worker-pool simulator
//!
//! A single dispatcher hands arithmetic tickets to a fixed pool of worker
//! threads. Each worker has a one-entry mailbox guarded by a Ready/Busy
//! semaphore pair; results are collected one assignment late, the next
//! time the dispatcher touches that worker, and a final drain collects the
//! rest before every worker is told to stop.
//!
//! ## Quick Start
//!
//! ```ignore
//! use parcalc::{parse_program, SimConfig, Simulation};
//!
//! fn main() -> parcalc::SimResult<()> {
//!     let program = parse_program("2\n0 6 * 7\n0 9 / 3\n")?;
//!     let summary = Simulation::new(SimConfig::from_env()).run(&program)?;
//!     for line in summary.log.lines() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Dispatcher                            │
//! │     reserve worker, harvest stale result, post ticket       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ SlotGrant
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Mailboxes                             │
//! │    SharedSlot × N, Ready(i)/Busy(i), free-worker gate       │
//! └─────────────────────────────────────────────────────────────┘
//!          ▲                   ▲                   ▲
//!          │ WorkerLease       │                   │
//!    ┌───────────┐      ┌───────────┐      ┌───────────┐
//!    │  Worker 0 │      │  Worker 1 │ ...  │ Worker N-1│
//!    └───────────┘      └───────────┘      └───────────┘
//! ```

// Re-export core types
pub use parcalc_core::{
    ArithmeticError,
    Command,
    Operator,
    Outcome,
    Program,
    ResultLog,
    ResultRecord,
    SimError,
    SimResult,
    SlotState,
    WorkTicket,
    WorkerSelector,
    load_program,
    parse_program,
};

// Re-export env utilities
pub use parcalc_core::{env_get, env_get_opt};

// Re-export runtime types
pub use parcalc_runtime::{
    Dispatcher,
    Mailboxes,
    RunSummary,
    SimConfig,
    WorkerPool,
    WorkerReport,
};

pub use parcalc_core::constants;
pub use parcalc_runtime::config;

/// One run of a parsed program
///
/// Starts the pool, dispatches every ticket in file order, drains and
/// joins the workers.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run `program` to completion.
    ///
    /// Errors here are setup errors (bad config, too many workers, a
    /// thread that would not start, a ticket for a worker that does not
    /// exist). Panicked workers are reported in
    /// [`RunSummary::teardown_errors`] instead.
    pub fn run(&self, program: &Program) -> SimResult<RunSummary> {
        log::info!(
            "running {} tickets on {} workers",
            program.tickets.len(),
            program.num_workers
        );

        let mut dispatcher =
            Dispatcher::start(program.num_workers, program.tickets.len(), &self.config)?;
        dispatcher.dispatch_all(&program.tickets)?;
        Ok(dispatcher.finish())
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
