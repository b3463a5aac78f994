//! # Runtime events emitted by the supervisor, worker units and the watchdog.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Task events**: one worker's lifecycle (launched, returned, failed, abandoned)
//! - **Batch events**: watchdog observations and driver signals
//! - **Subscriber events**: delivery problems (overflow, panic)
//!
//! The [`Event`] struct carries metadata such as timestamps, index and resource
//! names, a counter snapshot and a free-text reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use indexvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskAbandoned)
//!     .with_index("docs")
//!     .with_resource("/sites/default/big.pdf")
//!     .with_timeout(Duration::from_secs(60));
//!
//! assert_eq!(ev.kind, EventKind::TaskAbandoned);
//! assert_eq!(ev.resource.as_deref(), Some("/sites/default/big.pdf"));
//! assert_eq!(ev.timeout_ms, Some(60_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::Counts;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task events ===
    /// A worker was launched for a resource.
    ///
    /// Sets: `index`, `resource`, `counts`
    TaskLaunched,

    /// A worker reported completion (possibly after being abandoned).
    ///
    /// Sets: `index`, `resource`, `counts`
    TaskReturned,

    /// A worker returned an error or panicked; it still counts as returned.
    ///
    /// Sets: `index`, `resource`, `reason`
    TaskFailed,

    /// A worker missed its deadline, was abandoned and signalled to cancel.
    ///
    /// Sets: `index`, `resource`, `timeout_ms`, `counts`
    TaskAbandoned,

    // === Batch events ===
    /// The driver finalized the batch; no more launches are accepted.
    ///
    /// Sets: `index`, `counts`
    BatchFinalized,

    /// Final statistics were reported.
    ///
    /// Sets: `index`, `counts`, `reason` (formatted runtime)
    StatisticsReported,

    /// A watchdog poll found workers still in flight.
    ///
    /// Sets: `index`, `counts`, `attempt` (poll number)
    WatchdogStall,

    /// The watchdog saw the batch complete.
    ///
    /// Sets: `index`, `counts`
    WatchdogFinished,

    /// The watchdog ran out of polls with workers outstanding.
    ///
    /// Sets: `index`, `counts`
    WatchdogExhausted,

    // === Subscriber events ===
    /// A subscriber panicked during event processing.
    ///
    /// Sets: `resource` (subscriber name), `reason` (panic message)
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `resource` (subscriber name), `reason`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Global sequence number.
    pub seq: u64,
    /// Wall-clock creation time.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Index the batch builds.
    pub index: Option<Arc<str>>,
    /// Resource root path (or subscriber name for subscriber events).
    pub resource: Option<Arc<str>>,
    /// Counter snapshot taken with the change that produced this event.
    pub counts: Option<Counts>,
    /// Deadline in milliseconds (clamped to `u32::MAX`).
    pub timeout_ms: Option<u32>,
    /// Watchdog poll number.
    pub attempt: Option<u32>,
    /// Free-text reason or error.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event with the next sequence number and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            index: None,
            resource: None,
            counts: None,
            timeout_ms: None,
            attempt: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_index(mut self, index: impl Into<Arc<str>>) -> Self {
        self.index = Some(index.into());
        self
    }

    #[inline]
    pub fn with_resource(mut self, resource: impl Into<Arc<str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    #[inline]
    pub fn with_counts(mut self, counts: Counts) -> Self {
        self.counts = Some(counts);
        self
    }

    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_resource(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_resource(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TaskLaunched);
        let b = Event::new(EventKind::TaskReturned);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn timeout_is_clamped_to_u32() {
        let ev = Event::new(EventKind::TaskAbandoned).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));
    }

    #[test]
    fn subscriber_events_carry_name_and_reason() {
        let ev = Event::subscriber_overflow("metrics", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.resource.as_deref(), Some("metrics"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=metrics reason=full"));
    }
}
