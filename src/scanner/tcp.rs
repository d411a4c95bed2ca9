//! TCP connect prober.
//!
//! Performs a full TCP handshake through the operating system's socket API
//! and closes the connection immediately. No application data is read or
//! written.

use crate::error::ProbeError;
use crate::scanner::traits::{CloseReason, ProbeOutcome, ProbeRequest, Prober};
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::{timeout_at, Instant};

/// TCP connect prober.
///
/// Resolution and connection share a single deadline of `request.timeout`.
/// Refusal and timeout both classify as closed/filtered; anything else the
/// transport reports is carried back as an errored outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }

    async fn resolve(
        &self,
        request: &ProbeRequest,
        deadline: Instant,
    ) -> Result<Vec<SocketAddr>, ProbeError> {
        let port = request.port.as_u16();
        if let Some(ip) = request.address.as_ip() {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }

        let host = request.address.host();
        let lookup = lookup_host((host.clone(), port));
        let addrs: Vec<SocketAddr> = match timeout_at(deadline, lookup).await {
            Ok(Ok(addrs)) => addrs.collect(),
            Ok(Err(e)) => {
                return Err(ProbeError::Resolution {
                    host,
                    reason: e.to_string(),
                })
            }
            Err(_) => return Err(ProbeError::ResolutionTimeout(host)),
        };

        if addrs.is_empty() {
            return Err(ProbeError::NoAddresses(host));
        }
        Ok(addrs)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, request: ProbeRequest) -> ProbeOutcome {
        let port = request.port;
        let deadline = Instant::now() + request.timeout;

        let addrs = match self.resolve(&request, deadline).await {
            Ok(addrs) => addrs,
            Err(cause) => return ProbeOutcome::Errored { port, cause },
        };

        match timeout_at(deadline, TcpStream::connect(addrs.as_slice())).await {
            Ok(Ok(stream)) => {
                drop(stream);
                ProbeOutcome::Open { port }
            }
            Ok(Err(e)) => classify_connect_error(&request, e),
            Err(_) => ProbeOutcome::ClosedOrFiltered {
                port,
                reason: CloseReason::TimedOut,
            },
        }
    }
}

fn classify_connect_error(request: &ProbeRequest, e: io::Error) -> ProbeOutcome {
    let port = request.port;
    match e.kind() {
        io::ErrorKind::ConnectionRefused => ProbeOutcome::ClosedOrFiltered {
            port,
            reason: CloseReason::Refused,
        },
        io::ErrorKind::TimedOut => ProbeOutcome::ClosedOrFiltered {
            port,
            reason: CloseReason::TimedOut,
        },
        _ => ProbeOutcome::Errored {
            port,
            cause: ProbeError::Connect {
                addr: request.endpoint(),
                reason: e.to_string(),
            },
        },
    }
}
