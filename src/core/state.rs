//! # Batch counters and the completion handle.
//!
//! [`BatchState`] owns the three counters of a batch behind a single mutex:
//!
//! ```text
//! launch()            ──► record_started()     (launching context)
//! launch() deadline   ──► record_abandoned()   (launching context)
//! Completion/finished ──► record_returned()    (worker context)
//! watchdog / driver   ──► snapshot()           (any context)
//! ```
//!
//! ## Rules
//! - Every counter is non-decreasing.
//! - A snapshot is taken under the same lock as the writes, so one snapshot
//!   never mixes two partial updates.
//! - An abandoned worker that finishes later still increments `returned`;
//!   `returned + abandoned` may then exceed `started`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::events::{Bus, Event, EventKind};

/// Point-in-time view of the batch counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    /// Workers launched.
    pub started: u64,
    /// Workers that reported completion.
    pub returned: u64,
    /// Workers whose deadline elapsed before they reported.
    pub abandoned: u64,
}

impl Counts {
    /// Workers neither returned nor abandoned.
    ///
    /// Saturates at zero when late completions of abandoned workers make
    /// `returned + abandoned` exceed `started`.
    pub fn in_flight(&self) -> u64 {
        self.started
            .saturating_sub(self.returned.saturating_add(self.abandoned))
    }

    /// True when every launched worker finished or was given up on.
    pub fn is_complete(&self) -> bool {
        self.returned.saturating_add(self.abandoned) >= self.started
    }
}

/// Final (or mid-batch) statistics of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Workers launched.
    pub started: u64,
    /// Workers that reported completion.
    pub returned: u64,
    /// Workers whose deadline elapsed before they reported.
    pub abandoned: u64,
    /// Runtime reported by the progress sink.
    pub elapsed: Duration,
}

impl BatchStats {
    pub(crate) fn new(counts: Counts, elapsed: Duration) -> Self {
        Self {
            started: counts.started,
            returned: counts.returned,
            abandoned: counts.abandoned,
            elapsed,
        }
    }

    /// The counter part of the statistics.
    pub fn counts(&self) -> Counts {
        Counts {
            started: self.started,
            returned: self.returned,
            abandoned: self.abandoned,
        }
    }
}

/// Shared counter state of one batch.
#[derive(Debug, Default)]
pub(crate) struct BatchState {
    counts: Mutex<Counts>,
}

impl BatchState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn record_started(&self) -> Counts {
        let mut c = self.lock();
        c.started += 1;
        *c
    }

    pub(crate) fn record_returned(&self) -> Counts {
        let mut c = self.lock();
        c.returned += 1;
        *c
    }

    pub(crate) fn record_abandoned(&self) -> Counts {
        let mut c = self.lock();
        c.abandoned += 1;
        *c
    }

    pub(crate) fn snapshot(&self) -> Counts {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, Counts> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Completion callback handed to one worker unit.
///
/// Consumed by [`complete`](Completion::complete), so a unit reports at most once.
#[must_use = "a worker unit must report its completion"]
pub(crate) struct Completion {
    state: Arc<BatchState>,
    bus: Bus,
    index: Arc<str>,
    resource: Arc<str>,
}

impl Completion {
    pub(crate) fn new(
        state: Arc<BatchState>,
        bus: Bus,
        index: Arc<str>,
        resource: Arc<str>,
    ) -> Self {
        Self {
            state,
            bus,
            index,
            resource,
        }
    }

    /// Increments `returned` and publishes `TaskReturned`.
    pub(crate) fn complete(self) {
        let counts = self.state.record_returned();
        self.bus.publish(
            Event::new(EventKind::TaskReturned)
                .with_index(self.index)
                .with_resource(self.resource)
                .with_counts(counts),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent_and_monotonic() {
        let state = BatchState::new();
        assert_eq!(state.record_started().started, 1);
        assert_eq!(state.record_started().started, 2);
        assert_eq!(state.record_returned().returned, 1);
        assert_eq!(state.record_abandoned().abandoned, 1);

        let c = state.snapshot();
        assert_eq!(
            c,
            Counts {
                started: 2,
                returned: 1,
                abandoned: 1
            }
        );
        assert!(c.is_complete());
        assert_eq!(c.in_flight(), 0);
    }

    #[test]
    fn late_return_of_abandoned_worker_saturates_in_flight() {
        let c = Counts {
            started: 3,
            returned: 3,
            abandoned: 3,
        };
        assert!(c.is_complete());
        assert_eq!(c.in_flight(), 0);
    }

    #[test]
    fn incomplete_batch_reports_in_flight() {
        let c = Counts {
            started: 5,
            returned: 2,
            abandoned: 1,
        };
        assert!(!c.is_complete());
        assert_eq!(c.in_flight(), 2);
    }

    #[test]
    fn completion_increments_returned_once() {
        let state = BatchState::new();
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        state.record_started();

        Completion::new(state.clone(), bus, Arc::from("idx"), Arc::from("/a")).complete();

        assert_eq!(state.snapshot().returned, 1);
        let ev = rx.try_recv().expect("event published");
        assert_eq!(ev.kind, EventKind::TaskReturned);
        assert_eq!(ev.resource.as_deref(), Some("/a"));
        assert_eq!(ev.counts.map(|c| c.returned), Some(1));
    }

    #[test]
    fn stats_round_trip_counts() {
        let counts = Counts {
            started: 4,
            returned: 3,
            abandoned: 1,
        };
        let stats = BatchStats::new(counts, Duration::from_secs(2));
        assert_eq!(stats.counts(), counts);
        assert_eq!(stats.elapsed, Duration::from_secs(2));
    }
}
