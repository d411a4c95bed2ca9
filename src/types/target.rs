//! Target address validation.
//!
//! Accepts:
//! - IPv4 and IPv6 literals ("192.168.1.1", "::1", "[::1]")
//! - Hostnames ("example.com", "localhost")
//!
//! Hostnames are only checked for shape here. Resolution happens per probe,
//! so an unresolvable name shows up as errored ports rather than a fatal
//! configuration error.

use serde::{Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;

/// Error type for target validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("address is empty")]
    Empty,
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
}

/// A validated scan target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetAddress {
    /// A literal IP address.
    Ip(IpAddr),
    /// A hostname to be resolved at probe time.
    Hostname(String),
}

impl TargetAddress {
    /// Parse and validate a target address.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Ip(ip));
        }

        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            return inner
                .parse::<IpAddr>()
                .map(Self::Ip)
                .map_err(|_| TargetError::InvalidFormat(s.to_string()));
        }

        let host = s.strip_suffix('.').unwrap_or(s);
        if is_valid_hostname(host) {
            return Ok(Self::Hostname(host.to_ascii_lowercase()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Host part suitable for `host:port` joining (no brackets).
    pub fn host(&self) -> String {
        match self {
            Self::Ip(ip) => ip.to_string(),
            Self::Hostname(name) => name.clone(),
        }
    }

    pub fn as_ip(&self) -> Option<IpAddr> {
        match self {
            Self::Ip(ip) => Some(*ip),
            Self::Hostname(_) => None,
        }
    }

    /// Join with a port, bracketing IPv6 literals.
    pub fn join_port(&self, port: u16) -> String {
        match self {
            Self::Ip(IpAddr::V6(ip)) => format!("[{}]:{}", ip, port),
            Self::Ip(IpAddr::V4(ip)) => format!("{}:{}", ip, port),
            Self::Hostname(name) => format!("{}:{}", name, port),
        }
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "{}", ip),
            Self::Hostname(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for TargetAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label must be 1-63 characters
    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        // Must start and end with alphanumeric
        if !label.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.ends_with(|c: char| c.is_ascii_alphanumeric()) {
            return false;
        }
        // Underscores show up in service and container names.
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return false;
        }
    }

    true
}
