//! # parcalc-core
//!
//! Core types for the parcalc worker-pool simulator.
//!
//! This crate is platform-agnostic and contains no synchronization code.
//! Signals, mailboxes, workers and the dispatcher live in `parcalc-runtime`.
//!
//! ## Modules
//!
//! - `op` - Arithmetic operators and computation outcomes
//! - `ticket` - Work tickets and worker selectors
//! - `slot` - Per-worker mailbox contents
//! - `record` - Result records and the ordered result log
//! - `parse` - Configuration file parser
//! - `error` - Error types
//! - `env` - Environment variable utilities

pub mod op;
pub mod ticket;
pub mod slot;
pub mod record;
pub mod parse;
pub mod error;
pub mod env;

// Re-exports for convenience
pub use op::{ArithmeticError, Operator, Outcome};
pub use ticket::{WorkTicket, WorkerSelector};
pub use slot::{Command, SlotState};
pub use record::{ResultLog, ResultRecord};
pub use parse::{load_program, parse_program, Program};
pub use error::{SimError, SimResult};
pub use env::{env_get, env_get_opt};

/// Limits shared by the parser and the runtime
pub mod constants {
    /// Hard ceiling on the number of simulated workers
    pub const MAX_WORKERS: usize = 1024;

    /// Character written in place of an operator to stop a worker
    pub const TERMINATION_MARKER: char = 'K';

    /// Text written instead of a value for a failed computation
    pub const ERROR_RESULT: &str = "ERR";
}
