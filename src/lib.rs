//! # ptscan - A Bounded-Concurrency TCP Port Scanner
//!
//! Probes every port of an inclusive range on one host with a TCP connect,
//! keeping at most `N` probes in flight, and reports the open ports in
//! ascending order.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ptscan::config::ScanConfig;
//! use ptscan::scanner::ScanCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ptscan::ScanError> {
//!     let config = ScanConfig::new("127.0.0.1")
//!         .with_ports(1, 1024)
//!         .with_timeout_ms(200)
//!         .with_concurrency(64);
//!
//!     let report = ScanCoordinator::tcp().run(&config).await?;
//!     for port in &report.open_ports {
//!         println!("{:>6} is open", port.as_u16());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - `Port`, `PortRange` and `TargetAddress` with validation
//! - [`scanner`] - the coordinator, concurrency limiter and TCP prober
//! - [`config`] - scan configuration and the settings file
//! - [`cli`] - command-line flags
//! - [`output`] - plain and JSON rendering
//! - [`error`] - error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, ProbeError, ScanError};
pub use scanner::{ProbeOutcome, Prober, ScanCoordinator, ScanReport};
pub use types::{Port, PortRange, TargetAddress};
