//! Core error types for compass-core.
//!
//! Errors are split by the component that raises them so callers can tell a
//! recoverable read problem from a lost commit.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Core error type for compass-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reading the persisted record failed in a way that is not recoverable
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Writing the persisted record failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Commit was rejected at the API boundary
    #[error("Commit rejected: {0}")]
    Commit(#[from] CommitError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure kinds when reading the state file.
///
/// `NotFound`, `Unreadable` and `Corrupt` are recovered to a default record by
/// [`crate::storage::load_or_default`]. `Io` is never swallowed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no state file at {path}")]
    NotFound { path: PathBuf },

    #[error("state file at {path} is unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("failed to read state file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Whether the failure should fall back to the default record.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, LoadError::Io { .. })
    }
}

/// Failure when persisting the record. Always fatal for the commit.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write state file at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reasons a commit is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("position {value} is outside 0..=100")]
    InvalidPosition { value: i64 },

    #[error("already committed for {date}; the compass is locked until tomorrow")]
    CommitWhileLocked { date: NaiveDate },

    #[error("clock went backwards: {today} is before the last commit on {stored}")]
    DateRegressed { stored: NaiveDate, today: NaiveDate },

    #[error("not yet: commits open at {cutoff} reference time (now {now})")]
    NotYetWritable { cutoff: NaiveTime, now: NaiveTime },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
