//! # In-memory progress sink.
//!
//! [`MemoryReport`] records everything printed to it. Embedders use it to
//! render the report later (e.g. in an admin screen); tests use it to assert
//! on progress output.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use super::sink::{Format, ProgressSink};

/// One recorded piece of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    /// Text appended to the current line.
    Text {
        /// The printed text.
        text: String,
        /// Its format tag.
        format: Format,
    },
    /// Line terminator.
    Newline,
}

/// Progress sink that keeps output in memory.
#[derive(Debug)]
pub struct MemoryReport {
    started: Instant,
    entries: Mutex<Vec<ReportEntry>>,
}

impl MemoryReport {
    /// Creates an empty report; the runtime clock starts now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of all recorded entries.
    pub fn entries(&self) -> Vec<ReportEntry> {
        self.lock().clone()
    }

    /// Returns the output as lines; an unterminated last line is included.
    pub fn lines(&self) -> Vec<String> {
        let entries = self.lock();
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut open = false;

        for entry in entries.iter() {
            match entry {
                ReportEntry::Text { text, .. } => {
                    current.push_str(text);
                    open = true;
                }
                ReportEntry::Newline => {
                    lines.push(std::mem::take(&mut current));
                    open = false;
                }
            }
        }
        if open {
            lines.push(current);
        }
        lines
    }

    /// Returns the texts printed with the given format.
    pub fn texts_with(&self, format: Format) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEntry::Text { text, format: f } if *f == format => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ReportEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MemoryReport {
    fn print(&self, text: &str, format: Format) {
        self.lock().push(ReportEntry::Text {
            text: text.to_string(),
            format,
        });
    }

    fn newline(&self) {
        self.lock().push(ReportEntry::Newline);
    }

    fn runtime(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Message;

    #[test]
    fn lines_join_segments_until_newline() {
        let report = MemoryReport::new();
        report.newline();
        report.print_message(&Message::Failed, Format::Warning);
        report.println("timeout", Format::Warning);
        report.print("dangling", Format::Default);

        assert_eq!(report.lines(), vec!["", "FAILED: timeout", "dangling"]);
    }

    #[test]
    fn texts_with_filters_by_format() {
        let report = MemoryReport::new();
        report.println("Indexing finished", Format::Headline);
        report.println("stats", Format::Default);

        assert_eq!(report.texts_with(Format::Headline), vec!["Indexing finished"]);
        assert_eq!(report.entries().len(), 4);
    }
}
