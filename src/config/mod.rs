//! Configuration for ptscan.
//!
//! `ScanConfig` holds the raw values supplied by the CLI and is validated
//! into a `ValidatedScan` before any probe runs. `Settings` provides
//! file-based defaults from the XDG configuration directory.

mod scan;
mod settings;

pub use scan::{ScanConfig, ValidatedScan};
pub use settings::{Paths, Settings};
