//! # Console and null progress sinks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use super::sink::{Format, ProgressSink};

/// Prints progress to stdout.
///
/// Warnings, errors and headlines get a bracketed prefix when they start a line.
///
/// ## Example output
/// ```text
/// [warning] FAILED: timeout while indexing "/docs/huge.pdf", abandoning worker
/// [headline] Indexing finished
/// 12 resources started, 11 returned, 1 abandoned, runtime 00:01:04
/// ```
#[derive(Debug)]
pub struct ConsoleReport {
    started: Instant,
    at_line_start: AtomicBool,
}

impl ConsoleReport {
    /// Creates a console sink; the runtime clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            at_line_start: AtomicBool::new(true),
        }
    }
}

impl Default for ConsoleReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleReport {
    fn print(&self, text: &str, format: Format) {
        if self.at_line_start.swap(false, Ordering::AcqRel) {
            match format {
                Format::Warning | Format::Error | Format::Headline => {
                    print!("[{}] ", format.as_label());
                }
                _ => {}
            }
        }
        print!("{text}");
    }

    fn newline(&self) {
        self.at_line_start.store(true, Ordering::Release);
        println!();
    }

    fn runtime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Discards all output; only tracks the runtime.
///
/// Used when a supervisor is built without a sink.
#[derive(Debug)]
pub struct NullReport {
    started: Instant,
}

impl NullReport {
    /// Creates a null sink; the runtime clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for NullReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for NullReport {
    fn print(&self, _text: &str, _format: Format) {}

    fn newline(&self) {}

    fn runtime(&self) -> Duration {
        self.started.elapsed()
    }
}
