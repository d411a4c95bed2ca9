//! Verbose per-attempt trace lines.
//!
//! Trace output is advisory: it never affects classification or ordering.

use std::io::{self, Write};
use std::sync::Mutex;

/// Receives human-readable progress lines.
pub trait TraceSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Discards all lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn line(&self, _line: &str) {}
}

/// Prints lines to stdout prefixed with `[VERBOSE]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutTrace;

impl TraceSink for StdoutTrace {
    fn line(&self, line: &str) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        // A closed stdout must not take the scan down with it.
        let _ = writeln!(out, "[VERBOSE] {}", line);
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemoryTrace {
    lines: Mutex<Vec<String>>,
}

impl MemoryTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl TraceSink for MemoryTrace {
    fn line(&self, line: &str) {
        let mut lines = self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        lines.push(line.to_string());
    }
}
