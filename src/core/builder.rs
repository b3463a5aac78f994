use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use super::state::BatchState;
use super::supervisor::Supervisor;
use super::watchdog::Watchdog;
use crate::config::SupervisorConfig;
use crate::events::Bus;
use crate::report::{NullReport, ProgressSink};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::workers::Worker;

/// Builder for constructing a [`Supervisor`] with optional collaborators.
pub struct SupervisorBuilder<W: Worker> {
    worker: Arc<W>,
    cfg: SupervisorConfig,
    sink: Option<Arc<dyn ProgressSink>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<W: Worker> SupervisorBuilder<W> {
    /// Creates a new builder for `worker` with the given configuration.
    pub fn new(worker: Arc<W>, cfg: SupervisorConfig) -> Self {
        Self {
            worker,
            cfg,
            sink: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the progress sink. Without one, output is discarded ([`NullReport`]).
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor, starts the subscriber listener and the watchdog.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Arc<Supervisor<W>> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(NullReport::new()) as Arc<dyn ProgressSink>);
        let index: Arc<str> = Arc::from(self.cfg.index_name.as_str());
        let state = BatchState::new();
        let finalized = CancellationToken::new();
        let runtime_token = CancellationToken::new();

        let sup = Arc::new(Supervisor {
            index: Arc::clone(&index),
            worker: self.worker,
            sink,
            bus: bus.clone(),
            state: Arc::clone(&state),
            subs,
            finalized: finalized.clone(),
            runtime_token: runtime_token.clone(),
            watchdog: Mutex::new(None),
            cfg: self.cfg,
        });
        sup.subscriber_listener();

        let watchdog = Watchdog {
            state,
            bus,
            index,
            warmup: sup.cfg.watchdog_warmup,
            interval: sup.cfg.watchdog_interval,
            max_polls: sup.cfg.watchdog_max_polls,
            finalized,
            runtime: runtime_token,
        }
        .spawn();
        if let Ok(mut slot) = sup.watchdog.lock() {
            *slot = Some(watchdog);
        }
        sup
    }
}
