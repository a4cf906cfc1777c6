//! Environment variable utilities
//!
//! # Usage
//!
//! ```ignore
//! use parcalc_core::env::{env_get, env_get_opt};
//!
//! let max_workers: usize = env_get("PARCALC_MAX_WORKERS", 256);
//! let delay_ms: Option<u64> = env_get_opt("PARCALC_COMPUTE_DELAY_MS");
//! ```

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default
///
/// Unset variables and values that fail to parse both yield the default.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Get environment variable as optional value
///
/// Returns `Some(T)` if the variable is set and parses successfully,
/// `None` otherwise.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
