//! Port types with validation.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is the inclusive interval a scan walks through.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Port {
    type Error = PortError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("max ({1}) is less than min ({0})")]
    Inverted(u32, u32),
}

/// An inclusive range of ports, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    min: Port,
    max: Port,
}

impl PortRange {
    /// Validate raw bounds into a range.
    ///
    /// Fails when either bound lies outside 1-65535 or when `max < min`.
    pub fn validate(min: u32, max: u32) -> Result<Self, PortError> {
        if max < min {
            return Err(PortError::Inverted(min, max));
        }
        let min = Port::try_from(min)?;
        let max = Port::try_from(max)?;
        Ok(Self { min, max })
    }

    /// The full 1-65535 range.
    pub const fn full() -> Self {
        Self {
            min: Port(Port::MIN),
            max: Port(Port::MAX),
        }
    }

    pub const fn min(&self) -> Port {
        self.min
    }

    pub const fn max(&self) -> Port {
        self.max
    }

    /// Number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.max.0 - self.min.0) as usize + 1
    }

    /// Always false; a validated range holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, port: Port) -> bool {
        self.min <= port && port <= self.max
    }

    /// Iterate over all ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.min.0..=self.max.0).map(Port)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}
