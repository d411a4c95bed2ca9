//! Error types for ptscan.
//!
//! Uses `thiserror` for ergonomic error definitions. Configuration problems
//! are fatal and surface before any probe is dispatched; probe failures are
//! contained per port and end up in the scan tally instead.

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Invalid scan configuration, detected before scanning starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid addr: {0}")]
    InvalidAddress(#[from] TargetError),

    #[error("invalid port range: {0}")]
    InvalidRange(#[from] PortError),

    #[error("invalid timeout: must be greater than 0ms")]
    InvalidTimeout,

    #[error("invalid concurrency: must be at least 1")]
    InvalidConcurrency,

    #[error("failed to read settings from {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("could not determine configuration directory")]
    DirectoryNotFound,
}

/// Transport-level failure of a single probe, other than refusal or timeout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("lookup {host}: {reason}")]
    Resolution { host: String, reason: String },

    #[error("lookup {0}: no addresses found")]
    NoAddresses(String),

    #[error("lookup {0}: timed out")]
    ResolutionTimeout(String),

    #[error("dial tcp {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("probe panicked")]
    Panicked,
}

/// Error type for the scan entrypoint.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("concurrency limiter closed")]
    LimiterClosed(#[from] tokio::sync::AcquireError),

    #[error("result aggregator failed: {0}")]
    Aggregator(#[from] tokio::task::JoinError),
}

/// Result type alias for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
