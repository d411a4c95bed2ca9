//! Command-line interface definitions for ptscan.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags left
//! unset fall back to the settings file, then to built-in defaults.

use crate::config::{ScanConfig, Settings};
use crate::error::ConfigResult;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// A bounded-concurrency TCP port scanner.
#[derive(Parser, Debug)]
#[command(name = "ptscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan a host for open TCP ports", long_about = None)]
pub struct Cli {
    /// Address to scan (IP or hostname)
    #[arg(long, env = "PTSCAN_ADDR", value_name = "ADDR")]
    pub addr: Option<String>,

    /// Lowest port to scan [default: 1]
    #[arg(long, value_name = "PORT")]
    pub port_min: Option<u32>,

    /// Highest port to scan [default: 65535]
    #[arg(long, value_name = "PORT")]
    pub port_max: Option<u32>,

    /// Connection timeout in milliseconds [default: 1000]
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum number of probes in flight [default: 100]
    #[arg(short = 'c', long, alias = "concurrent", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Print every connection attempt
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Print a closed/errored tally to stderr after the results
    #[arg(long)]
    pub summary: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `<port> is open` line per open port
    #[default]
    Plain,
    /// JSON structured output
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl Cli {
    /// Load the settings file named by `--config`, or the default one.
    pub fn settings(&self) -> ConfigResult<Settings> {
        match &self.config {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        }
    }

    /// Merge flags over `settings`. Validation is left to the caller.
    pub fn scan_config(&self, settings: &Settings) -> ScanConfig {
        let mut config = settings.scan_config(self.addr.clone().unwrap_or_default());
        if let Some(min) = self.port_min {
            config.port_min = min;
        }
        if let Some(max) = self.port_max {
            config.port_max = max;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        config.verbose |= self.verbose;
        config
    }
}
