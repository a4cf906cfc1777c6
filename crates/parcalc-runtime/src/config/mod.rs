//! Runtime configuration
//!
//! Provides compile-time defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder methods
//! 2. Environment variables
//! 3. Library defaults (`config::defaults`)
//!
//! # Example
//!
//! ```rust,ignore
//! use parcalc_runtime::config::SimConfig;
//!
//! let config = SimConfig::from_env()
//!     .compute_delay(Duration::from_millis(5))
//!     .max_workers(16);
//! config.validate()?;
//! ```

pub mod defaults;

use std::time::Duration;
use parcalc_core::constants::MAX_WORKERS;
use parcalc_core::env::env_get;
use parcalc_core::error::SimError;
use thiserror::Error;

/// Runtime configuration with builder pattern.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Upper bound on the worker count a program may request
    pub max_workers: usize,
    /// Artificial delay each worker sleeps before computing
    pub compute_delay: Duration,
    /// Stack size of each worker thread, in bytes
    pub worker_stack_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SimConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `PARCALC_MAX_WORKERS` - Largest worker count accepted
    /// - `PARCALC_COMPUTE_DELAY_MS` - Per-computation delay in milliseconds
    /// - `PARCALC_WORKER_STACK_KB` - Worker stack size in KiB
    pub fn from_env() -> Self {
        Self {
            max_workers: env_get("PARCALC_MAX_WORKERS", defaults::MAX_WORKERS),
            compute_delay: Duration::from_millis(env_get(
                "PARCALC_COMPUTE_DELAY_MS",
                defaults::COMPUTE_DELAY_MS,
            )),
            worker_stack_size: env_get("PARCALC_WORKER_STACK_KB", defaults::WORKER_STACK_KB) * 1024,
        }
    }

    /// Create config with explicit defaults (no env override).
    /// Useful for testing or when you want full control.
    pub fn new() -> Self {
        Self {
            max_workers: defaults::MAX_WORKERS,
            compute_delay: Duration::from_millis(defaults::COMPUTE_DELAY_MS),
            worker_stack_size: defaults::WORKER_STACK_KB * 1024,
        }
    }

    // Builder methods

    pub fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = n;
        self
    }

    pub fn compute_delay(mut self, d: Duration) -> Self {
        self.compute_delay = d;
        self
    }

    pub fn worker_stack_size(mut self, bytes: usize) -> Self {
        self.worker_stack_size = bytes;
        self
    }

    /// Validate configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue("max_workers must be > 0"));
        }
        if self.max_workers > MAX_WORKERS {
            return Err(ConfigError::InvalidValue("max_workers must be <= 1024"));
        }
        if self.worker_stack_size < defaults::MIN_WORKER_STACK_KB * 1024 {
            return Err(ConfigError::InvalidValue("worker_stack_size must be >= 16KB"));
        }
        Ok(())
    }

    /// Log the configuration at debug level
    pub fn log_summary(&self) {
        log::debug!("parcalc configuration:");
        log::debug!("  max_workers:        {}", self.max_workers);
        log::debug!("  compute_delay:      {:?}", self.compute_delay);
        log::debug!("  worker_stack_size:  {}", self.worker_stack_size);
    }
}

/// Configuration error
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("{0}")]
    InvalidValue(&'static str),
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::InvalidConfig(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_valid() {
        let config = SimConfig::new();
        assert_eq!(config.max_workers, defaults::MAX_WORKERS);
        assert_eq!(config.compute_delay, Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SimConfig::new()
            .max_workers(8)
            .compute_delay(Duration::from_millis(5))
            .worker_stack_size(128 * 1024);

        assert_eq!(config.max_workers, 8);
        assert_eq!(config.compute_delay, Duration::from_millis(5));
        assert_eq!(config.worker_stack_size, 128 * 1024);
    }

    #[test]
    fn test_validation() {
        assert!(SimConfig::new().max_workers(0).validate().is_err());
        assert!(SimConfig::new().max_workers(5000).validate().is_err());
        assert!(SimConfig::new().worker_stack_size(1024).validate().is_err());
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("PARCALC_COMPUTE_DELAY_MS", "7");
        let config = SimConfig::from_env();
        std::env::remove_var("PARCALC_COMPUTE_DELAY_MS");
        assert_eq!(config.compute_delay, Duration::from_millis(7));
    }

    #[test]
    fn test_config_error_converts() {
        let config_err = ConfigError::InvalidValue("max_workers must be > 0");
        assert_eq!(config_err.to_string(), "max_workers must be > 0");
        let err: SimError = config_err.into();
        assert!(matches!(err, SimError::InvalidConfig(_)));
        assert_eq!(err.to_string(), "invalid runtime config: max_workers must be > 0");
    }
}
