//! # parcalc-runtime
//!
//! Threads and synchronization for the parcalc simulator.
//!
//! This crate provides:
//! - Binary semaphores (futex on Linux, Mutex/Condvar elsewhere)
//! - The free-worker gate used for AnyFree discovery
//! - Per-worker mailboxes guarded by grant/lease tokens
//! - Worker threads and the pool that owns them
//! - The dispatcher that assigns tickets, harvests results and drains
//!
//! ```text
//!   Dispatcher ──grant──> Mailboxes[i] <──lease── WorkerLoop(i)
//!        │                    │                        │
//!        └──── SyncGroup: Ready(i), Busy(i), free gate ┘
//! ```

pub mod config;
pub mod signal;
pub mod gate;
pub mod sync;
pub mod mailbox;
pub mod worker;
pub mod dispatcher;

// Re-exports
pub use config::SimConfig;
pub use signal::{PlatformSignal, Signal};
pub use gate::CountingGate;
pub use sync::{SyncGroup, WorkerSignals};
pub use mailbox::{Mailboxes, SlotGrant, WorkerLease};
pub use worker::{WorkerLoop, WorkerPhase, WorkerPool, WorkerReport};
pub use dispatcher::{Dispatcher, RunSummary};
