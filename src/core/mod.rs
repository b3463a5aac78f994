//! Runtime core: launching, accounting and stall monitoring.
//!
//! The public API from this module is [`Supervisor`] (with its builder),
//! the launch and watchdog outcomes, and the counter snapshots.
//!
//! Internal modules:
//! - [`runner`]: spawns one worker unit and reports its completion exactly once;
//! - [`state`]: the three batch counters behind a single lock;
//! - [`supervisor`]: launch with deadline, statistics, finalize/interrupt;
//! - [`watchdog`]: warm-up, bounded polling and exit diagnostics;
//! - [`shutdown`]: OS termination signals.

mod builder;
mod runner;
mod shutdown;
mod state;
mod supervisor;
mod watchdog;

pub use builder::SupervisorBuilder;
pub use state::{BatchStats, Counts};
pub use supervisor::{LaunchOutcome, Supervisor};
pub use watchdog::WatchdogExit;
