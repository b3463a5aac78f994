//! # Stdout logging subscriber for demos and debugging.
//!
//! ## Output format
//! ```text
//! [launched] index=docs resource=/srv/a.txt
//! [abandoned] index=docs resource=/srv/b.txt timeout=60000ms
//! [stall] index=docs poll=3 in_flight=1 abandoned=1
//! [watchdog-exhausted] index=docs outstanding=1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Prints human-readable event lines to stdout.
///
/// Enabled via the `logging` feature. For structured output use the
/// `tracing` records the supervisor already emits.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let index = e.index.as_deref().unwrap_or("-");
        let resource = e.resource.as_deref().unwrap_or("-");
        let counts = e.counts.unwrap_or_default();

        match e.kind {
            EventKind::TaskLaunched => {
                println!("[launched] index={index} resource={resource}");
            }
            EventKind::TaskReturned => {
                println!("[returned] index={index} resource={resource}");
            }
            EventKind::TaskFailed => {
                println!(
                    "[failed] index={index} resource={resource} err={:?}",
                    e.reason
                );
            }
            EventKind::TaskAbandoned => {
                println!(
                    "[abandoned] index={index} resource={resource} timeout={}ms",
                    e.timeout_ms.unwrap_or(0)
                );
            }
            EventKind::BatchFinalized => println!("[finalized] index={index}"),
            EventKind::StatisticsReported => {
                println!(
                    "[stats] index={index} started={} returned={} abandoned={}",
                    counts.started, counts.returned, counts.abandoned
                );
            }
            EventKind::WatchdogStall => {
                println!(
                    "[stall] index={index} poll={} in_flight={} abandoned={}",
                    e.attempt.unwrap_or(0),
                    counts.in_flight(),
                    counts.abandoned
                );
            }
            EventKind::WatchdogFinished => println!("[watchdog-finished] index={index}"),
            EventKind::WatchdogExhausted => {
                println!(
                    "[watchdog-exhausted] index={index} outstanding={}",
                    counts.in_flight()
                );
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] name={resource} info={:?}", e.reason);
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] name={resource} reason={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
