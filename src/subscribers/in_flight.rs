//! # In-flight resource tracker.
//!
//! Keeps the set of resources that were launched and have not returned yet.
//! Abandoned resources stay in the set until their worker actually returns,
//! which makes the tracker a cheap answer to "what is still running?".
//!
//! Event mapping:
//! - `TaskLaunched` → add resource
//! - `TaskReturned` → remove resource
//!
//! The same resource may be launched more than once; each launch is counted.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Tracks resources whose workers are still running.
#[derive(Default)]
pub struct InFlightTracker {
    running: RwLock<HashMap<Arc<str>, u32>>,
}

impl InFlightTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a sorted snapshot of resources still in flight.
    pub fn snapshot(&self) -> Vec<String> {
        let guard = self.running.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<String> = guard.keys().map(|r| r.to_string()).collect();
        out.sort_unstable();
        out
    }

    /// True if `resource` has at least one running worker.
    pub fn is_running(&self, resource: &str) -> bool {
        self.running
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(resource)
    }

    fn launched(&self, resource: &Arc<str>) {
        let mut guard = self.running.write().unwrap_or_else(PoisonError::into_inner);
        *guard.entry(Arc::clone(resource)).or_insert(0) += 1;
    }

    fn returned(&self, resource: &Arc<str>) {
        let mut guard = self.running.write().unwrap_or_else(PoisonError::into_inner);
        let drained = match guard.get_mut(resource) {
            Some(n) => {
                *n -= 1;
                *n == 0
            }
            None => false,
        };
        if drained {
            guard.remove(resource);
        }
    }
}

#[async_trait]
impl Subscribe for InFlightTracker {
    async fn on_event(&self, ev: &Event) {
        let Some(resource) = &ev.resource else {
            return;
        };
        match ev.kind {
            EventKind::TaskLaunched => self.launched(resource),
            EventKind::TaskReturned => self.returned(resource),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "in-flight"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: EventKind, resource: &str) -> Event {
        Event::new(kind).with_resource(resource)
    }

    #[tokio::test]
    async fn tracks_launch_and_return() {
        let t = InFlightTracker::new();
        t.on_event(&ev(EventKind::TaskLaunched, "/b")).await;
        t.on_event(&ev(EventKind::TaskLaunched, "/a")).await;
        assert_eq!(t.snapshot(), vec!["/a".to_string(), "/b".to_string()]);

        t.on_event(&ev(EventKind::TaskAbandoned, "/a")).await;
        assert!(t.is_running("/a"));

        t.on_event(&ev(EventKind::TaskReturned, "/a")).await;
        assert!(!t.is_running("/a"));
        assert_eq!(t.snapshot(), vec!["/b".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_launches_are_counted() {
        let t = InFlightTracker::new();
        t.on_event(&ev(EventKind::TaskLaunched, "/a")).await;
        t.on_event(&ev(EventKind::TaskLaunched, "/a")).await;
        t.on_event(&ev(EventKind::TaskReturned, "/a")).await;
        assert!(t.is_running("/a"));
        t.on_event(&ev(EventKind::TaskReturned, "/a")).await;
        assert!(t.snapshot().is_empty());
    }

    #[tokio::test]
    async fn unknown_return_is_ignored() {
        let t = InFlightTracker::new();
        t.on_event(&ev(EventKind::TaskReturned, "/x")).await;
        t.on_event(&Event::new(EventKind::TaskLaunched)).await;
        assert!(t.snapshot().is_empty());
    }
}
