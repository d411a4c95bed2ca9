//! Scan configuration and validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{PortRange, TargetAddress};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default lowest port scanned.
pub const DEFAULT_PORT_MIN: u32 = 1;
/// Default highest port scanned.
pub const DEFAULT_PORT_MAX: u32 = 65535;
/// Default per-probe timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
/// Default number of probes in flight.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Unvalidated scan parameters as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub address: String,
    pub port_min: u32,
    pub port_max: u32,
    pub timeout_ms: u64,
    pub concurrency: usize,
    pub verbose: bool,
}

impl ScanConfig {
    /// Create a configuration for `address` with default settings.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port_min: DEFAULT_PORT_MIN,
            port_max: DEFAULT_PORT_MAX,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
            verbose: false,
        }
    }

    /// Set the inclusive port bounds.
    pub fn with_ports(mut self, min: u32, max: u32) -> Self {
        self.port_min = min;
        self.port_max = max;
        self
    }

    /// Set the per-probe timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Enable per-attempt trace lines.
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Check every parameter. Nothing is probed if this fails.
    pub fn validate(&self) -> ConfigResult<ValidatedScan> {
        let address = TargetAddress::parse(&self.address)?;
        let range = PortRange::validate(self.port_min, self.port_max)?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        // More slots than ports are never used.
        let concurrency = NonZeroUsize::new(self.concurrency.min(range.len()))
            .ok_or(ConfigError::InvalidConcurrency)?;

        Ok(ValidatedScan {
            address,
            range,
            timeout: Duration::from_millis(self.timeout_ms),
            concurrency,
            verbose: self.verbose,
        })
    }
}

/// Scan parameters that have passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedScan {
    pub address: TargetAddress,
    pub range: PortRange,
    pub timeout: Duration,
    pub concurrency: NonZeroUsize,
    pub verbose: bool,
}
