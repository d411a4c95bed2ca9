//! File-based defaults.
//!
//! Looks for `settings.json` in the XDG configuration directory
//! (~/.config/ptscan on Linux). A missing file means built-in defaults.

use super::scan::{
    ScanConfig, DEFAULT_CONCURRENCY, DEFAULT_PORT_MAX, DEFAULT_PORT_MIN, DEFAULT_TIMEOUT_MS,
};
use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/ptscan)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the XDG directories for ptscan.
    pub fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("", "", "ptscan").ok_or(ConfigError::DirectoryNotFound)?;
        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Default scan parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub port_min: u32,
    pub port_max: u32,
    pub timeout_ms: u64,
    pub concurrency: usize,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port_min: DEFAULT_PORT_MIN,
            port_max: DEFAULT_PORT_MAX,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
            verbose: false,
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> ConfigResult<Self> {
        let file = match Paths::new() {
            Ok(paths) => paths.settings_file(),
            Err(_) => return Ok(Self::default()),
        };

        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Start a scan configuration for `address` seeded with these defaults.
    pub fn scan_config(&self, address: impl Into<String>) -> ScanConfig {
        let config = ScanConfig::new(address)
            .with_ports(self.port_min, self.port_max)
            .with_timeout_ms(self.timeout_ms)
            .with_concurrency(self.concurrency);
        if self.verbose {
            config.with_verbose()
        } else {
            config
        }
    }
}
