//! # Supervisor: launches indexing workers under a deadline and keeps the batch counters.
//!
//! The [`Supervisor`] owns the batch counters, the per-task timeout, the progress
//! sink and the event bus. It is created once per index build; construction
//! starts the watchdog.
//!
//! ## Key responsibilities
//! - run one worker unit per [`launch`](Supervisor::launch) and wait up to the timeout
//! - on timeout: warn, report, count as abandoned, signal cancellation, move on
//! - keep `started` / `returned` / `abandoned` consistent under one lock
//! - report final statistics to the sink and the log
//!
//! ## Launch flow
//! ```text
//! launch(resource, writer, index)
//!   ├─► finalized? ──► Err(BatchFinalized)     interrupted? ──► Err(ShutDown)
//!   ├─► started += 1, publish TaskLaunched
//!   ├─► spawn_unit(worker, job, completion)
//!   └─► select (biased) {
//!         unit done      ──► Completed | Failed      (returned already counted by the unit)
//!         deadline       ──► warn + sink "FAILED: timeout ..." + abandoned += 1
//!                            + token.cancel() + publish TaskAbandoned ──► Abandoned
//!         interrupt()    ──► Interrupted             (no counter change, no log)
//!       }
//! ```
//!
//! ## Rules
//! - `launch` calls are expected sequentially from one driver; workers run in parallel.
//! - If the worker finishes before the deadline, its `returned` increment happens
//!   before `launch` returns.
//! - An abandoned worker is never forced to stop. If it finishes later it is also
//!   counted as returned, so `returned + abandoned` can exceed `started`.

use std::future::pending;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::SupervisorConfig;
use crate::core::builder::SupervisorBuilder;
use crate::core::runner::spawn_unit;
use crate::core::shutdown;
use crate::core::state::{BatchState, BatchStats, Completion, Counts};
use crate::core::watchdog::WatchdogExit;
use crate::error::{SupervisorError, WorkerError};
use crate::events::{Bus, Event, EventKind};
use crate::report::{Format, Message, ProgressSink};
use crate::subscribers::SubscriberSet;
use crate::workers::{IndexJob, Resource, Worker};

/// Result of one [`Supervisor::launch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The worker finished in time.
    Completed,
    /// The worker finished in time with an error (it still counts as returned).
    Failed {
        /// What went wrong.
        error: WorkerError,
    },
    /// The deadline elapsed; the worker was abandoned and signalled to cancel.
    Abandoned,
    /// The wait itself was interrupted; nothing was counted besides `started`.
    Interrupted,
}

/// Coordinates indexing workers for one batch.
pub struct Supervisor<W: Worker> {
    pub(crate) cfg: SupervisorConfig,
    pub(crate) index: Arc<str>,
    pub(crate) worker: Arc<W>,
    pub(crate) sink: Arc<dyn ProgressSink>,
    pub(crate) bus: Bus,
    pub(crate) state: Arc<BatchState>,
    pub(crate) subs: Arc<SubscriberSet>,
    pub(crate) finalized: CancellationToken,
    pub(crate) runtime_token: CancellationToken,
    pub(crate) watchdog: Mutex<Option<JoinHandle<WatchdogExit>>>,
}

impl<W: Worker> Supervisor<W> {
    /// Creates a supervisor for `index_name` with the given per-task timeout and
    /// starts its watchdog.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        worker: Arc<W>,
        sink: Arc<dyn ProgressSink>,
        timeout: Duration,
        index_name: impl Into<String>,
    ) -> Arc<Self> {
        let cfg = SupervisorConfig {
            timeout,
            ..SupervisorConfig::new(index_name)
        };
        Self::builder(worker, cfg).with_sink(sink).build()
    }

    /// Returns a builder for full control over config, sink and subscribers.
    pub fn builder(worker: Arc<W>, cfg: SupervisorConfig) -> SupervisorBuilder<W> {
        SupervisorBuilder::new(worker, cfg)
    }

    /// Launches one worker for `resource` and waits up to the configured timeout.
    ///
    /// Returns `Err` only when the batch no longer accepts tasks; every other
    /// outcome, including an elapsed deadline, is an `Ok(LaunchOutcome)`.
    pub async fn launch(
        &self,
        resource: W::Resource,
        writer: W::Writer,
        index: W::Index,
    ) -> Result<LaunchOutcome, SupervisorError> {
        if self.finalized.is_cancelled() {
            return Err(SupervisorError::BatchFinalized {
                index: self.cfg.index_name.clone(),
            });
        }
        if self.runtime_token.is_cancelled() {
            return Err(SupervisorError::ShutDown {
                index: self.cfg.index_name.clone(),
            });
        }

        let path: Arc<str> = Arc::from(resource.root_path());
        let counts = self.state.record_started();
        self.bus.publish(
            Event::new(EventKind::TaskLaunched)
                .with_index(Arc::clone(&self.index))
                .with_resource(Arc::clone(&path))
                .with_counts(counts),
        );

        let completion = Completion::new(
            Arc::clone(&self.state),
            self.bus.clone(),
            Arc::clone(&self.index),
            Arc::clone(&path),
        );
        let job = IndexJob {
            resource,
            writer,
            index,
        };
        let mut unit = spawn_unit(Arc::clone(&self.worker), job, completion);

        let timeout = self.cfg.task_timeout();
        let deadline = async {
            match timeout {
                Some(dur) => time::sleep(dur).await,
                None => pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        select! {
            biased;
            res = &mut unit.done => Ok(self.on_returned(&path, res)),
            _ = &mut deadline => {
                // `deadline` only resolves when a timeout is configured.
                self.on_timeout(&path, timeout.unwrap_or_default(), &unit.token);
                Ok(LaunchOutcome::Abandoned)
            }
            _ = self.runtime_token.cancelled() => Ok(LaunchOutcome::Interrupted),
        }
    }

    /// Completion callback: records one returned worker.
    ///
    /// Worker units call this automatically; drivers that run work outside
    /// [`launch`](Self::launch) can call it themselves. Calls for workers that
    /// were already abandoned are accepted.
    pub fn finished(&self) {
        let counts = self.state.record_returned();
        self.bus.publish(
            Event::new(EventKind::TaskReturned)
                .with_index(Arc::clone(&self.index))
                .with_counts(counts),
        );
    }

    /// True once every launched worker returned or was abandoned.
    pub fn is_batch_complete(&self) -> bool {
        self.state.snapshot().is_complete()
    }

    /// Number of workers launched so far.
    pub fn started(&self) -> u64 {
        self.state.snapshot().started
    }

    /// Consistent snapshot of all three counters.
    pub fn counts(&self) -> Counts {
        self.state.snapshot()
    }

    /// Writes the batch statistics to the progress sink and the log.
    ///
    /// Pure observation: calling it again yields the same counters unless
    /// workers are still reporting.
    pub fn report_statistics(&self) -> BatchStats {
        let counts = self.state.snapshot();
        let runtime = self.sink.format_runtime();
        let stats = BatchStats::new(counts, self.sink.runtime());

        let msg = Message::IndexingStats {
            started: counts.started,
            returned: counts.returned,
            abandoned: counts.abandoned,
            runtime: runtime.clone(),
        };
        info!(
            msg = msg.as_label(),
            index = %self.index,
            started = counts.started,
            returned = counts.returned,
            abandoned = counts.abandoned,
            runtime = %runtime,
            "{msg}"
        );

        self.sink
            .println_message(&Message::IndexingEnd, Format::Headline);
        self.sink.println_message(&msg, Format::Default);

        self.bus.publish(
            Event::new(EventKind::StatisticsReported)
                .with_index(Arc::clone(&self.index))
                .with_counts(counts)
                .with_reason(runtime),
        );
        stats
    }

    /// Stops accepting launches and lets the watchdog exit once the batch is complete.
    pub fn finalize(&self) {
        if self.finalized.is_cancelled() {
            return;
        }
        self.finalized.cancel();
        self.bus.publish(
            Event::new(EventKind::BatchFinalized)
                .with_index(Arc::clone(&self.index))
                .with_counts(self.state.snapshot()),
        );
    }

    /// True once [`finalize`](Self::finalize) was called.
    pub fn is_finalized(&self) -> bool {
        self.finalized.is_cancelled()
    }

    /// Interrupts a pending launch wait and the watchdog; further launches are refused.
    ///
    /// Running workers are not cancelled.
    pub fn interrupt(&self) {
        self.runtime_token.cancel();
    }

    /// Calls [`interrupt`](Self::interrupt) when the process receives a termination signal.
    pub fn interrupt_on_signal(self: &Arc<Self>) {
        let token = self.runtime_token.clone();
        let index = Arc::clone(&self.index);
        tokio::spawn(async move {
            select! {
                res = shutdown::wait_for_shutdown_signal() => match res {
                    Ok(signal) => {
                        info!(index = %index, signal, "termination signal received; interrupting batch");
                        token.cancel();
                    }
                    Err(e) => warn!(index = %index, error = %e, "cannot listen for termination signals"),
                },
                _ = token.cancelled() => {}
            }
        });
    }

    /// Awaits the watchdog's result; `None` if it was already taken or did not join.
    pub async fn join_watchdog(&self) -> Option<WatchdogExit> {
        let handle = self
            .watchdog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        handle.await.ok()
    }

    /// Raw receiver of runtime events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Number of registered event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subs.len()
    }

    /// Name of the index this batch builds.
    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Effective configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    pub(crate) fn subscriber_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn on_returned(
        &self,
        path: &Arc<str>,
        res: Result<Result<(), WorkerError>, JoinError>,
    ) -> LaunchOutcome {
        let error = match res {
            Ok(Ok(())) => return LaunchOutcome::Completed,
            Ok(Err(e)) => e,
            Err(join) => WorkerError::fail(join.to_string()),
        };

        let msg = Message::WorkerFailed {
            resource: Arc::clone(path),
            error: error.to_string(),
        };
        warn!(
            msg = msg.as_label(),
            index = %self.index,
            worker = %self.worker.name(),
            resource = %path,
            error = error.as_label(),
            "{msg}"
        );
        self.sink.println_message(&msg, Format::Warning);
        self.bus.publish(
            Event::new(EventKind::TaskFailed)
                .with_index(Arc::clone(&self.index))
                .with_resource(Arc::clone(path))
                .with_reason(error.as_message()),
        );
        LaunchOutcome::Failed { error }
    }

    fn on_timeout(&self, path: &Arc<str>, timeout: Duration, token: &CancellationToken) {
        let msg = Message::IndexingTimeout {
            resource: Arc::clone(path),
        };
        warn!(
            msg = msg.as_label(),
            index = %self.index,
            worker = %self.worker.name(),
            resource = %path,
            timeout = ?timeout,
            "{msg}"
        );

        self.sink.newline();
        self.sink.print_message(&Message::Failed, Format::Warning);
        self.sink.println_message(&msg, Format::Warning);

        let counts = self.state.record_abandoned();
        token.cancel();

        self.bus.publish(
            Event::new(EventKind::TaskAbandoned)
                .with_index(Arc::clone(&self.index))
                .with_resource(Arc::clone(path))
                .with_timeout(timeout)
                .with_counts(counts),
        );
    }
}
