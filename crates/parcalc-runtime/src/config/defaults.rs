//! Compile-time defaults for [`SimConfig`](super::SimConfig)

/// Largest pool the runtime will create unless overridden
pub const MAX_WORKERS: usize = 256;

/// Artificial delay per computation, in milliseconds (0 = none)
pub const COMPUTE_DELAY_MS: u64 = 0;

/// Worker thread stack size, in KiB
pub const WORKER_STACK_KB: usize = 64;

/// Smallest stack size `validate()` accepts, in KiB
pub const MIN_WORKER_STACK_KB: usize = 16;

/// Worker thread name prefix; the worker index is appended
pub const THREAD_NAME_PREFIX: &str = "parcalc-worker";
