//! Error types for the simulator

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;

/// Errors that can occur while setting up, running or tearing down a simulation
///
/// Everything except [`SimError::WorkerPanicked`] is a setup error: fatal,
/// reported once, never retried.
#[derive(Debug, Error)]
pub enum SimError {
    /// Config file could not be opened or read
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    /// Config file has no worker-count line
    #[error("config file is empty")]
    EmptyConfig,

    /// Worker count below 1
    #[error("invalid worker count {value}: at least 1 worker is required")]
    InvalidWorkerCount { value: i64 },

    /// More workers than the signal set can hold
    #[error("cannot create {requested} workers: limit is {max}")]
    TooManyWorkers { requested: usize, max: usize },

    /// Malformed ticket or header line (1-based line number)
    #[error("config line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Ticket addressed to a worker that does not exist
    #[error("worker {index} does not exist in a pool of {workers}")]
    UnknownWorker { index: usize, workers: usize },

    /// Runtime configuration rejected by validation
    #[error("invalid runtime config: {0}")]
    InvalidConfig(String),

    /// Worker thread could not be started
    #[error("failed to spawn worker {index}: {source}")]
    Spawn { index: usize, source: io::Error },

    /// Result file could not be written
    #[error("failed to write results to {}: {source}", path.display())]
    ResultWrite { path: PathBuf, source: io::Error },

    /// Worker thread panicked before it could be joined
    #[error("worker {index} panicked")]
    WorkerPanicked { index: usize },
}

impl SimError {
    /// Setup errors abort the run; teardown errors are only reported
    pub fn is_setup(&self) -> bool {
        !matches!(self, SimError::WorkerPanicked { .. })
    }

    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        SimError::Parse { line, reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = SimError::InvalidWorkerCount { value: 0 };
        assert_eq!(format!("{}", e), "invalid worker count 0: at least 1 worker is required");

        let e = SimError::parse(3, "unknown operator '%'");
        assert_eq!(format!("{}", e), "config line 3: unknown operator '%'");

        let e = SimError::UnknownWorker { index: 4, workers: 2 };
        assert_eq!(format!("{}", e), "worker 4 does not exist in a pool of 2");
    }

    #[test]
    fn test_setup_classification() {
        assert!(SimError::EmptyConfig.is_setup());
        assert!(SimError::TooManyWorkers { requested: 9, max: 8 }.is_setup());
        assert!(!SimError::WorkerPanicked { index: 0 }.is_setup());
    }
}
