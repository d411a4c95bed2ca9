//! Plain text output formatting.

use crate::scanner::ScanReport;
use console::style;
use std::io::{self, Write};

/// Write one line per open port, ascending, e.g. `    22 is open`.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    for port in &report.open_ports {
        writeln!(out, "{:>6} is open", port.as_u16())?;
    }
    Ok(())
}

/// Write the closed/errored tally on one line.
pub fn write_summary<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(
        out,
        "{} ports scanned in {:.2}s: {} open, {} closed/filtered, {} errored",
        report.ports_scanned(),
        report.duration_ms as f64 / 1000.0,
        report.open_count(),
        report.closed_ports,
        report.errored_count()
    )
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}
