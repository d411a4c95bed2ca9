//! Output formatting module.
//!
//! Provides formatters for plain text and JSON output of scan results.

mod json_format;
mod plain;

pub use json_format::write_json;
pub use plain::{print_error, write_plain, write_summary};

use crate::cli::OutputFormat;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Format and print scan results according to the specified format.
pub fn print_results(report: &ScanReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_plain(&mut out, report)?,
        OutputFormat::Json => write_json(&mut out, report)?,
    }
    out.flush()
}
