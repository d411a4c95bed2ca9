//! Prober trait abstraction.
//!
//! Defines the single-port probe contract so the coordinator can drive the
//! real TCP prober and instrumented test probers interchangeably.

use crate::error::ProbeError;
use crate::types::{Port, TargetAddress};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// One connectivity attempt to perform.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub address: TargetAddress,
    pub port: Port,
    pub timeout: Duration,
}

impl ProbeRequest {
    pub fn new(address: TargetAddress, port: Port, timeout: Duration) -> Self {
        Self {
            address,
            port,
            timeout,
        }
    }

    /// `host:port` form used for dialing and trace output.
    pub fn endpoint(&self) -> String {
        self.address.join_port(self.port.as_u16())
    }
}

/// Why a port was classified closed or filtered.
///
/// Both reasons are the same classification; the distinction is kept only
/// for trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    Refused,
    TimedOut,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refused => write!(f, "connection refused"),
            Self::TimedOut => write!(f, "i/o timeout"),
        }
    }
}

/// Terminal classification of one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A connection was established within the timeout.
    Open { port: Port },
    /// Refused, or no answer before the timeout.
    ClosedOrFiltered { port: Port, reason: CloseReason },
    /// Any other transport failure. Never retried.
    Errored { port: Port, cause: ProbeError },
}

impl ProbeOutcome {
    pub fn port(&self) -> Port {
        match self {
            Self::Open { port }
            | Self::ClosedOrFiltered { port, .. }
            | Self::Errored { port, .. } => *port,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Failure description for trace output, `None` when open.
    pub fn failure(&self) -> Option<String> {
        match self {
            Self::Open { .. } => None,
            Self::ClosedOrFiltered { reason, .. } => Some(reason.to_string()),
            Self::Errored { cause, .. } => Some(cause.to_string()),
        }
    }
}

/// Trait for single-port probe implementations.
///
/// A prober must return exactly one outcome per request and must never
/// fail outward: every transport problem is folded into the outcome.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe one port.
    async fn probe(&self, request: ProbeRequest) -> ProbeOutcome;
}
