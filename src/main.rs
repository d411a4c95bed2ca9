use anyhow::Result;
use clap::Parser;
use ptscan::cli::Cli;
use ptscan::output;
use ptscan::scanner::{ScanCoordinator, StdoutTrace};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Configuration problems stop us before any probe is sent.
    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            output::print_error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };
    let scan = match cli.scan_config(&settings).validate() {
        Ok(scan) => scan,
        Err(e) => {
            output::print_error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    let report = ScanCoordinator::tcp()
        .with_trace(Arc::new(StdoutTrace))
        .scan(&scan)
        .await?;

    output::print_results(&report, cli.output)?;
    if cli.summary || scan.verbose {
        let stderr = io::stderr();
        let mut err = stderr.lock();
        output::write_summary(&mut err, &report)?;
        err.flush()?;
    }

    Ok(ExitCode::SUCCESS)
}
