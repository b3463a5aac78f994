//! # indexvisor
//!
//! **Indexvisor** supervises indexing workers for one index build.
//!
//! Each resource (a file tree, a repository, a document set) is indexed by one
//! worker call running on its own tokio task. The supervisor waits for it up to
//! a per-task deadline; workers that overrun are reported, counted as
//! *abandoned* and signalled to cancel, and the batch moves on. A background
//! watchdog keeps an eye on workers that never come back.
//!
//! ## Architecture
//! ```text
//!   driver ── launch(resource, writer, index) ──┐
//!                                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (one per index build)                                 │
//! │  - BatchState (started / returned / abandoned, one lock)          │
//! │  - ProgressSink (FAILED: timeout ..., statistics)                 │
//! │  - Bus (broadcast events)                                         │
//! │  - Watchdog (warm-up, bounded polling)                            │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ worker unit  │   │ worker unit  │   │ worker unit  │
//!     │ (own token)  │   │ (abandoned)  │   │ (own token)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ TaskReturned     │ TaskReturned     │ TaskReturned
//!            ▼                  ▼  (late)          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: SupervisorConfig::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                    sub1.on    sub2.on    subN.on
//!                    _event()   _event()   _event()
//! ```
//!
//! ## Counters
//! ```text
//! launch      ──► started   += 1
//! worker done ──► returned  += 1   (also for failed, panicked or late workers)
//! deadline    ──► abandoned += 1
//!
//! batch complete  ⇔  returned + abandoned >= started
//! ```
//!
//! ## Features
//! | Area               | Description                                              | Key types / traits                           |
//! |--------------------|----------------------------------------------------------|----------------------------------------------|
//! | **Supervision**    | Launch workers under a deadline, keep batch counters.    | [`Supervisor`], [`LaunchOutcome`]            |
//! | **Workers**        | Define indexing units as trait impls or closures.        | [`Worker`], [`WorkerFn`], [`IndexJob`]       |
//! | **Progress**       | Report timeouts and statistics to a user-facing sink.    | [`ProgressSink`], [`Message`], [`Format`]    |
//! | **Watchdog**       | Bounded stall monitoring after launches stop.            | [`WatchdogExit`]                             |
//! | **Subscriber API** | Hook into runtime events (metrics, audit, dashboards).   | [`Subscribe`], [`InFlightTracker`]           |
//! | **Errors**         | Typed errors for supervision and worker execution.       | [`SupervisorError`], [`WorkerError`]         |
//! | **Configuration**  | Centralize timeouts and watchdog cadence.                | [`SupervisorConfig`]                         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use indexvisor::{IndexJob, LaunchOutcome, MemoryReport, Supervisor, WorkerError, WorkerFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let worker = WorkerFn::arc(
//!         "tokenize",
//!         |job: IndexJob<String, (), ()>, _ctx: CancellationToken| async move {
//!             println!("indexing {}", job.resource);
//!             Ok::<(), WorkerError>(())
//!         },
//!     );
//!
//!     let report = Arc::new(MemoryReport::new());
//!     let sup = Supervisor::new(worker, report.clone(), Duration::from_secs(5), "docs");
//!
//!     let outcome = sup.launch("/srv/docs/a".to_string(), (), ()).await?;
//!     assert_eq!(outcome, LaunchOutcome::Completed);
//!
//!     sup.finalize();
//!     let stats = sup.report_statistics();
//!     assert_eq!((stats.started, stats.returned, stats.abandoned), (1, 1, 0));
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod report;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use config::SupervisorConfig;
pub use crate::core::{
    BatchStats, Counts, LaunchOutcome, Supervisor, SupervisorBuilder, WatchdogExit,
};
pub use error::{SupervisorError, WorkerError};
pub use events::{Event, EventKind};
pub use report::{
    ConsoleReport, Format, MemoryReport, Message, NullReport, ProgressSink, ReportEntry,
    format_elapsed,
};
pub use subscribers::{InFlightTracker, Subscribe, SubscriberSet};
pub use workers::{IndexJob, Resource, Worker, WorkerFn};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
