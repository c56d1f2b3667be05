//! Application settings and paths.
//!
//! Settings are read from `settings.json` in the XDG config directory
//! (`~/.config/rangescan` on Linux) unless a path is given explicitly.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Ports tried, in order, when ICMP probing is unavailable.
pub const DEFAULT_FALLBACK_PORTS: &[u16] = &[
    80, 443, 22, 445, 139, 21, 23, 3389, 8080, 53, 25, 110, 3306, 5432,
];

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/rangescan)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories.
    pub fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "rangescan", "rangescan")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Scanner and server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Default liveness timeout in milliseconds (rounded up to whole seconds).
    pub host_timeout_ms: u64,
    /// Default per-port connect timeout in milliseconds.
    pub port_timeout_ms: u64,
    /// Upper bound on each TCP fallback connect attempt.
    pub fallback_attempt_timeout_ms: u64,
    /// Default number of hosts probed concurrently.
    pub host_batch_size: usize,
    /// Default number of ports probed concurrently.
    pub port_batch_size: usize,
    /// Largest batch size a request may ask for.
    pub max_batch_size: usize,
    /// Largest timeout a request may ask for.
    pub max_timeout_ms: u64,
    /// Ports tried by the TCP liveness fallback, in order.
    pub fallback_ports: Vec<u16>,
    /// Start in ICMP mode. When false, liveness probing uses TCP from the start.
    pub icmp_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            host_timeout_ms: 1000,
            port_timeout_ms: 3000,
            fallback_attempt_timeout_ms: 1000,
            host_batch_size: 10,
            port_batch_size: 5,
            max_batch_size: 50,
            max_timeout_ms: 30_000,
            fallback_ports: DEFAULT_FALLBACK_PORTS.to_vec(),
            icmp_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults
    /// when no settings file exists.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::new()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the scanner cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host_batch_size == 0 || self.port_batch_size == 0 || self.max_batch_size == 0 {
            return Err(ConfigError::Invalid("batch sizes must be at least 1".to_string()));
        }
        if self.host_timeout_ms == 0
            || self.port_timeout_ms == 0
            || self.fallback_attempt_timeout_ms == 0
            || self.max_timeout_ms == 0
        {
            return Err(ConfigError::Invalid("timeouts must be at least 1 ms".to_string()));
        }
        if self.fallback_ports.is_empty() || self.fallback_ports.contains(&0) {
            return Err(ConfigError::Invalid(
                "fallback_ports must list ports between 1 and 65535".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamp a requested batch size into `1..=max_batch_size`.
    pub fn clamp_batch_size(&self, requested: Option<usize>, default: usize) -> usize {
        requested.unwrap_or(default).clamp(1, self.max_batch_size.max(1))
    }

    /// Clamp a requested timeout into `1..=max_timeout_ms`.
    pub fn clamp_timeout(&self, requested_ms: Option<u64>, default_ms: u64) -> Duration {
        Duration::from_millis(requested_ms.unwrap_or(default_ms).clamp(1, self.max_timeout_ms.max(1)))
    }

    /// Per-attempt timeout of the TCP liveness fallback.
    pub fn fallback_attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_attempt_timeout_ms)
    }
}
