//! Progress reporting: the sink contract, keyed messages and stock sinks.
//!
//! ## Contents
//! - [`ProgressSink`], [`Format`] the collaborator contract
//! - [`Message`] keyed messages with positional parameters
//! - [`MemoryReport`], [`ConsoleReport`], [`NullReport`] stock sinks
//! - [`format_elapsed`] `HH:MM:SS` runtime rendering

mod console;
mod memory;
mod message;
mod sink;

pub use console::{ConsoleReport, NullReport};
pub use memory::{MemoryReport, ReportEntry};
pub use message::Message;
pub use sink::{Format, ProgressSink, format_elapsed};
