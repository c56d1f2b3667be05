//! Error types for rangescan.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single probe.
///
/// Never surfaced to callers: each variant degrades to a port or host
/// status, or switches the liveness prober into TCP mode.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Destination unreachable: {0}")]
    Unreachable(String),

    #[error("ICMP facility unavailable: {0}")]
    FacilityUnavailable(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// A request rejected before any probe was sent.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Ports(#[from] PortError),

    #[error("missing target: supply one of 'target', 'ipRange' or 'singleIp'")]
    MissingTarget,

    #[error("missing 'ip' field")]
    MissingIp,

    #[error("invalid IPv4 address: {0}")]
    InvalidIp(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl RequestError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        400
    }
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by CLI command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
