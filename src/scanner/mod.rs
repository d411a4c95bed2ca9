//! Scanner module - drives a port range through the prober.
//!
//! The coordinator walks the range in ascending order, takes a slot from the
//! `ConcurrencyLimiter` for each port, and spawns the probe on the tokio
//! runtime without waiting for it. Outcomes are sent over a channel to a
//! single aggregator task, which owns the tally. Once every sender is gone
//! the tally is complete and is turned into a sorted `ScanReport`.

pub mod limiter;
pub mod tcp;
pub mod trace;
pub mod traits;

use crate::config::{ScanConfig, ValidatedScan};
use crate::error::{ProbeError, ScanResult};
use crate::types::{Port, PortRange, TargetAddress};
use futures::FutureExt;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

pub use limiter::{ConcurrencyLimiter, Slot};
pub use tcp::TcpProber;
pub use trace::{MemoryTrace, NullTrace, StdoutTrace, TraceSink};
pub use traits::{CloseReason, ProbeOutcome, ProbeRequest, Prober};

/// A port whose state could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErroredPort {
    pub port: Port,
    pub cause: String,
}

/// Final result of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub address: TargetAddress,
    pub range: PortRange,
    /// Open ports, ascending, no duplicates.
    pub open_ports: Vec<Port>,
    /// Number of ports refused or timed out.
    pub closed_ports: usize,
    /// Ports whose probe failed for another reason, ascending.
    pub errored_ports: Vec<ErroredPort>,
    pub duration_ms: u64,
}

impl ScanReport {
    /// Number of ports that reached a terminal state.
    pub fn ports_scanned(&self) -> usize {
        self.open_ports.len() + self.closed_ports + self.errored_ports.len()
    }

    pub fn open_count(&self) -> usize {
        self.open_ports.len()
    }

    pub fn errored_count(&self) -> usize {
        self.errored_ports.len()
    }
}

/// Outcomes collected by the aggregator task.
#[derive(Debug, Default)]
struct Tally {
    open: Vec<Port>,
    closed: usize,
    errored: Vec<ErroredPort>,
}

impl Tally {
    fn record(&mut self, outcome: ProbeOutcome, range: &PortRange) {
        if !range.contains(outcome.port()) {
            warn!(port = %outcome.port(), %range, "discarding outcome outside scan range");
            return;
        }
        match outcome {
            ProbeOutcome::Open { port } => self.open.push(port),
            ProbeOutcome::ClosedOrFiltered { .. } => self.closed += 1,
            ProbeOutcome::Errored { port, cause } => self.errored.push(ErroredPort {
                port,
                cause: cause.to_string(),
            }),
        }
    }

    fn total(&self) -> usize {
        self.open.len() + self.closed + self.errored.len()
    }

    /// Completion order is arbitrary, so sort here.
    fn into_report(mut self, scan: &ValidatedScan, started: Instant) -> ScanReport {
        self.open.sort_unstable();
        self.open.dedup();
        self.errored.sort_by_key(|e| e.port);

        ScanReport {
            address: scan.address.clone(),
            range: scan.range,
            open_ports: self.open,
            closed_ports: self.closed,
            errored_ports: self.errored,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Runs scans with a given prober.
pub struct ScanCoordinator {
    prober: Arc<dyn Prober>,
    trace: Arc<dyn TraceSink>,
}

impl ScanCoordinator {
    /// Create a coordinator around `prober`. Trace lines are discarded.
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            trace: Arc::new(NullTrace),
        }
    }

    /// Coordinator using the TCP connect prober.
    pub fn tcp() -> Self {
        Self::new(Arc::new(TcpProber::new()))
    }

    /// Send verbose trace lines to `trace`.
    pub fn with_trace(mut self, trace: Arc<dyn TraceSink>) -> Self {
        self.trace = trace;
        self
    }

    /// Validate `config` and scan. No probe is dispatched if validation fails.
    pub async fn run(&self, config: &ScanConfig) -> ScanResult<ScanReport> {
        let scan = config.validate()?;
        self.scan(&scan).await
    }

    /// Scan every port of an already validated configuration.
    pub async fn scan(&self, scan: &ValidatedScan) -> ScanResult<ScanReport> {
        let started = Instant::now();
        let limiter = ConcurrencyLimiter::new(scan.concurrency);
        let trace = scan.verbose.then(|| Arc::clone(&self.trace));

        debug!(
            address = %scan.address,
            range = %scan.range,
            concurrency = limiter.capacity(),
            timeout_ms = scan.timeout.as_millis() as u64,
            "starting scan"
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<ProbeOutcome>();
        let range = scan.range;
        let aggregator = tokio::spawn(async move {
            let mut tally = Tally::default();
            while let Some(outcome) = rx.recv().await {
                tally.record(outcome, &range);
            }
            tally
        });

        for port in scan.range.iter() {
            let slot = match limiter.try_acquire() {
                Some(slot) => slot,
                None => {
                    trace!(%port, in_use = limiter.in_use(), "waiting for a free slot");
                    limiter.acquire().await?
                }
            };
            let request = ProbeRequest::new(scan.address.clone(), port, scan.timeout);
            let prober = Arc::clone(&self.prober);
            let trace = trace.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let outcome = probe_once(prober.as_ref(), trace.as_deref(), request).await;
                slot.release();
                // The aggregator holds the receiver until every sender is dropped.
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        let tally = aggregator.await?;
        debug_assert_eq!(limiter.in_use(), 0);
        if tally.total() != scan.range.len() {
            warn!(
                expected = scan.range.len(),
                recorded = tally.total(),
                "scan tally does not cover the full range"
            );
        }

        let report = tally.into_report(scan, started);
        debug!(
            open = report.open_count(),
            closed = report.closed_ports,
            errored = report.errored_count(),
            duration_ms = report.duration_ms,
            "scan complete"
        );
        Ok(report)
    }
}

/// Run one probe, emitting trace lines and containing panics.
async fn probe_once(
    prober: &dyn Prober,
    trace: Option<&dyn TraceSink>,
    request: ProbeRequest,
) -> ProbeOutcome {
    let port = request.port;
    let endpoint = request.endpoint();
    if let Some(trace) = trace {
        emit(trace, format!("scan {}", endpoint));
    }

    let outcome = AssertUnwindSafe(prober.probe(request))
        .catch_unwind()
        .await
        .unwrap_or(ProbeOutcome::Errored {
            port,
            cause: ProbeError::Panicked,
        });

    if let ProbeOutcome::Errored { cause, .. } = &outcome {
        debug!(%endpoint, error = %cause, "probe errored");
    }
    if let (Some(trace), Some(failure)) = (trace, outcome.failure()) {
        emit(trace, format!("scan {} failed: {}", endpoint, failure));
    }
    outcome
}

/// Hand a line to the sink. A panicking sink loses the line, not the port.
fn emit(trace: &dyn TraceSink, line: String) {
    if panic::catch_unwind(AssertUnwindSafe(|| trace.line(&line))).is_err() {
        warn!(%line, "trace sink panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock target with a fixed set of open ports.
    ///
    /// Tracks how many probes are inside `probe` at once and how many were
    /// ever started.
    struct MockProber {
        open: HashSet<u16>,
        errored: bool,
        panic_on: Option<u16>,
        delay: Duration,
        current: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl MockProber {
        fn with_open(open: &[u16]) -> Self {
            Self {
                open: open.iter().copied().collect(),
                errored: false,
                panic_on: None,
                delay: Duration::from_millis(1),
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        fn always_errored() -> Self {
            Self {
                errored: true,
                ..Self::with_open(&[])
            }
        }

        fn delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn panic_on(mut self, port: u16) -> Self {
            self.panic_on = Some(port);
            self
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Prober for MockProber {
        async fn probe(&self, request: ProbeRequest) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            // Vary the sleep per port so completions arrive out of order.
            let jitter = Duration::from_micros(u64::from(request.port.as_u16() % 7) * 300);
            tokio::time::sleep(self.delay + jitter).await;
            self.current.fetch_sub(1, Ordering::SeqCst);

            let port = request.port;
            if self.panic_on == Some(port.as_u16()) {
                panic!("mock prober fault on port {}", port);
            }
            if self.errored {
                return ProbeOutcome::Errored {
                    port,
                    cause: ProbeError::NoAddresses(request.address.host()),
                };
            }
            if self.open.contains(&port.as_u16()) {
                ProbeOutcome::Open { port }
            } else {
                ProbeOutcome::ClosedOrFiltered {
                    port,
                    reason: CloseReason::Refused,
                }
            }
        }
    }

    fn ports(report: &ScanReport) -> Vec<u16> {
        report.open_ports.iter().map(|p| p.as_u16()).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_all_ports_open() {
        let all: Vec<u16> = (100..=160).collect();
        let prober = Arc::new(MockProber::with_open(&all));
        let config = ScanConfig::new("127.0.0.1")
            .with_ports(100, 160)
            .with_concurrency(7);

        let report = ScanCoordinator::new(prober.clone()).run(&config).await.unwrap();
        assert_eq!(ports(&report), all);
        assert_eq!(report.closed_ports, 0);
        assert_eq!(report.ports_scanned(), 61);
        assert_eq!(prober.calls(), 61);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_ports_open() {
        let prober = Arc::new(MockProber::with_open(&[]));
        let config = ScanConfig::new("127.0.0.1")
            .with_ports(1, 200)
            .with_concurrency(25);

        let report = tokio::time::timeout(
            Duration::from_secs(10),
            ScanCoordinator::new(prober).run(&config),
        )
        .await
        .expect("scan should terminate")
        .unwrap();
        assert!(report.open_ports.is_empty());
        assert_eq!(report.closed_ports, 200);
        assert_eq!(report.errored_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrency_never_exceeds_limit() {
        for limit in [1usize, 3, 8, 32] {
            let prober = Arc::new(
                MockProber::with_open(&[5, 50]).delay(Duration::from_millis(3)),
            );
            let config = ScanConfig::new("127.0.0.1")
                .with_ports(1, 120)
                .with_concurrency(limit);

            let report = ScanCoordinator::new(prober.clone()).run(&config).await.unwrap();
            assert!(
                prober.peak() <= limit,
                "peak {} exceeded limit {}",
                prober.peak(),
                limit
            );
            assert!(prober.peak() >= 1);
            assert_eq!(ports(&report), vec![5, 50]);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_result_independent_of_concurrency() {
        let open = [3, 17, 64, 65, 199, 200];
        let mut results = Vec::new();
        for limit in [1usize, 2, 10, 500] {
            let prober = Arc::new(MockProber::with_open(&open));
            let config = ScanConfig::new("127.0.0.1")
                .with_ports(1, 200)
                .with_concurrency(limit);
            let report = ScanCoordinator::new(prober).run(&config).await.unwrap();
            results.push(ports(&report));
        }
        for result in &results {
            assert_eq!(result, &open.to_vec());
        }
    }

    #[tokio::test]
    async fn test_config_error_dispatches_nothing() {
        let prober = Arc::new(MockProber::with_open(&[80]));
        let coordinator = ScanCoordinator::new(prober.clone());

        let inverted = ScanConfig::new("127.0.0.1").with_ports(5000, 4000);
        assert!(coordinator.run(&inverted).await.is_err());

        let empty = ScanConfig::new("").with_ports(1, 10);
        assert!(coordinator.run(&empty).await.is_err());

        assert_eq!(prober.calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_known_open_ports_in_first_thousand() {
        let prober = Arc::new(MockProber::with_open(&[22, 80, 443]));
        let config = ScanConfig::new("127.0.0.1")
            .with_ports(1, 1000)
            .with_timeout_ms(50)
            .with_concurrency(10);

        let report = ScanCoordinator::new(prober.clone()).run(&config).await.unwrap();
        assert_eq!(ports(&report), vec![22, 80, 443]);
        assert_eq!(report.closed_ports, 997);
        assert!(prober.peak() <= 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_errored_probes_release_slots() {
        let prober = Arc::new(MockProber::always_errored().delay(Duration::from_millis(10)));
        let config = ScanConfig::new("127.0.0.1")
            .with_ports(1, 100)
            .with_concurrency(10);

        // 100 ports / 10 slots = 10 rounds of ~10ms. A leaked slot would stall.
        let report = tokio::time::timeout(
            Duration::from_secs(5),
            ScanCoordinator::new(prober.clone()).run(&config),
        )
        .await
        .expect("scan stalled; slots leaked on error path")
        .unwrap();

        assert!(report.open_ports.is_empty());
        assert_eq!(report.closed_ports, 0);
        assert_eq!(report.errored_count(), 100);
        assert!(prober.peak() <= 10);
        let errored: Vec<u16> = report.errored_ports.iter().map(|e| e.port.as_u16()).collect();
        assert_eq!(errored, (1..=100).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_probe_is_contained() {
        let prober = Arc::new(MockProber::with_open(&[2, 9]).panic_on(7));
        let config = ScanConfig::new("127.0.0.1")
            .with_ports(1, 10)
            .with_concurrency(1);

        let report = ScanCoordinator::new(prober).run(&config).await.unwrap();
        assert_eq!(ports(&report), vec![2, 9]);
        assert_eq!(report.ports_scanned(), 10);
        assert_eq!(
            report.errored_ports,
            vec![ErroredPort {
                port: Port::new(7).unwrap(),
                cause: "probe panicked".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_verbose_trace_lines() {
        let prober = Arc::new(MockProber::with_open(&[2]));
        let trace = Arc::new(MemoryTrace::new());
        let config = ScanConfig::new("127.0.0.1")
            .with_ports(1, 2)
            .with_concurrency(1)
            .with_verbose();

        ScanCoordinator::new(prober)
            .with_trace(trace.clone())
            .run(&config)
            .await
            .unwrap();

        let lines = trace.lines();
        assert!(lines.contains(&"scan 127.0.0.1:1".to_string()));
        assert!(lines.contains(&"scan 127.0.0.1:1 failed: connection refused".to_string()));
        assert!(lines.contains(&"scan 127.0.0.1:2".to_string()));
        assert_eq!(lines.len(), 3);
    }

    /// Sink that blows up on every line.
    struct FaultyTrace;

    impl TraceSink for FaultyTrace {
        fn line(&self, _line: &str) {
            panic!("trace sink fault");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_faulty_trace_does_not_drop_ports() {
        let prober = Arc::new(MockProber::with_open(&[3, 8]));
        let config = ScanConfig::new("127.0.0.1")
            .with_ports(1, 10)
            .with_concurrency(3)
            .with_verbose();

        let report = ScanCoordinator::new(prober)
            .with_trace(Arc::new(FaultyTrace))
            .run(&config)
            .await
            .unwrap();
        assert_eq!(ports(&report), vec![3, 8]);
        assert_eq!(report.closed_ports, 8);
        assert_eq!(report.errored_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_concurrency_is_clamped() {
        let prober = Arc::new(MockProber::with_open(&[2]));
        let config = ScanConfig::new("127.0.0.1")
            .with_ports(1, 2)
            .with_concurrency(usize::MAX);

        let report = ScanCoordinator::new(prober.clone()).run(&config).await.unwrap();
        assert_eq!(ports(&report), vec![2]);
        assert_eq!(report.ports_scanned(), 2);
        assert!(prober.peak() <= 2);
    }

    #[test]
    fn test_tally_ignores_ports_outside_range() {
        let range = PortRange::validate(10, 20).unwrap();
        let mut tally = Tally::default();
        tally.record(ProbeOutcome::Open { port: Port::new(15).unwrap() }, &range);
        tally.record(ProbeOutcome::Open { port: Port::new(99).unwrap() }, &range);
        assert_eq!(tally.open, vec![Port::new(15).unwrap()]);
        assert_eq!(tally.total(), 1);
    }

    #[tokio::test]
    async fn test_quiet_scan_emits_no_trace() {
        let trace = Arc::new(MemoryTrace::new());
        let config = ScanConfig::new("127.0.0.1").with_ports(1, 5);

        ScanCoordinator::new(Arc::new(MockProber::with_open(&[])))
            .with_trace(trace.clone())
            .run(&config)
            .await
            .unwrap();
        assert!(trace.lines().is_empty());
    }
}
