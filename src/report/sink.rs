//! # Progress sink trait.
//!
//! Provides [`ProgressSink`], the collaborator receiving human-readable
//! progress output, and the [`Format`] tag attached to every piece of text.
//!
//! ## Rules
//! - Sinks are shared between the launching context and the watchdog;
//!   they synchronize internally (`Send + Sync`).
//! - The supervisor never retries or times out sink calls.

use std::time::Duration;

use super::message::Message;

/// Format tag for printed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Plain text.
    #[default]
    Default,
    /// Secondary information.
    Note,
    /// Positive outcome.
    Ok,
    /// Something went wrong but the batch continues.
    Warning,
    /// Hard failure.
    Error,
    /// Section headline.
    Headline,
}

impl Format {
    /// Returns a short stable label for this format.
    pub fn as_label(&self) -> &'static str {
        match self {
            Format::Default => "default",
            Format::Note => "note",
            Format::Ok => "ok",
            Format::Warning => "warning",
            Format::Error => "error",
            Format::Headline => "headline",
        }
    }
}

/// Receiver of progress output for one indexing batch.
///
/// Only [`print`](ProgressSink::print), [`newline`](ProgressSink::newline)
/// and [`runtime`](ProgressSink::runtime) are required. Sinks that localize
/// output override [`print_message`](ProgressSink::print_message) and look the
/// text up by [`Message::as_label`].
pub trait ProgressSink: Send + Sync + 'static {
    /// Appends text to the current line.
    fn print(&self, text: &str, format: Format);

    /// Terminates the current line.
    fn newline(&self);

    /// Time elapsed since the sink started reporting.
    fn runtime(&self) -> Duration;

    /// Appends text and terminates the line.
    fn println(&self, text: &str, format: Format) {
        self.print(text, format);
        self.newline();
    }

    /// Appends a keyed message to the current line.
    fn print_message(&self, message: &Message, format: Format) {
        self.print(&message.to_string(), format);
    }

    /// Appends a keyed message and terminates the line.
    fn println_message(&self, message: &Message, format: Format) {
        self.print_message(message, format);
        self.newline();
    }

    /// Human-readable runtime, `HH:MM:SS` by default.
    fn format_runtime(&self) -> String {
        format_elapsed(self.runtime())
    }
}

/// Renders a duration as `HH:MM:SS`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use indexvisor::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_secs(3725)), "01:02:05");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_elapsed_pads_and_truncates() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_millis(59_999)), "00:00:59");
        assert_eq!(format_elapsed(Duration::from_secs(100 * 3600)), "100:00:00");
    }

    #[test]
    fn default_format_is_plain() {
        assert_eq!(Format::default(), Format::Default);
        assert_eq!(Format::Headline.as_label(), "headline");
    }
}
