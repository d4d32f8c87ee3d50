//! Environment-variable configuration parsing.
//!
//! Every service reads a handful of `KEY=value` environment variables at
//! startup. A malformed value (e.g. `MAX_QUEUE_SIZE=abc`) is a fatal
//! configuration error: the process should refuse to start rather than fall
//! back to a silently-wrong default.

use std::env;
use std::str::FromStr;

/// Errors that can occur while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was present but could not be parsed as the expected type.
    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        name: &'static str,
        /// Raw value read from the environment.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Thin wrapper around [`std::env::var`] that centralizes default-handling
/// and typed parsing so binaries don't each reimplement it.
pub struct EnvSource;

impl EnvSource {
    /// Read `name`, parse it as `T`, or fall back to `default` if unset.
    pub fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(value) => value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                name,
                value,
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Read `name` as a raw string, or fall back to `default`.
    pub fn string_or(name: &'static str, default: impl Into<String>) -> String {
        env::var(name).unwrap_or_else(|_| default.into())
    }

    /// Read `name` as an optional raw string (absent means unconfigured).
    pub fn optional_string(name: &'static str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }

    /// Read a comma-separated list, dropping empty entries. Returns an empty
    /// vector if the variable is unset or blank.
    pub fn comma_list(name: &'static str) -> Vec<String> {
        env::var(name)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
