//! # Watchdog: background stall monitor for one batch.
//!
//! Started together with the supervisor, independent of `launch` calls.
//!
//! ```text
//! Warm-up ── sleep(warmup) ─────────────────────────────┐
//!                                                       ▼
//! Polling ── repeat max_polls times:                    │
//!              sleep(interval)                          │
//!              counts.is_complete()? ──► yes ──► exit   │
//!              no ──► warn + WatchdogStall              │
//!                                                       ▼
//! Exit ──── complete   ──► info  "all finished"  + WatchdogFinished
//!      └─── incomplete ──► error "not finished"  + WatchdogExhausted
//! ```
//!
//! ## Rules
//! - Lifetime is bounded by `warmup + interval * max_polls`, independent of batch size.
//! - `finalize()` wakes a pending sleep; if the batch is complete the watchdog exits
//!   at once, otherwise it keeps its normal cadence.
//! - `interrupt()` ends polling early; the exit logic still runs.
//! - A panic in the polling phase is swallowed; the exit logic still runs.
//! - Exhaustion is purely observational: no error is raised, nothing is rolled back.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::core::state::BatchState;
use crate::events::{Bus, Event, EventKind};
use crate::report::Message;

/// How the watchdog ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogExit {
    /// Every launched worker returned or was abandoned.
    Finished {
        /// Polls performed before the batch was seen complete.
        polls: u32,
    },
    /// The poll budget ran out with workers still in flight.
    Exhausted {
        /// Workers neither returned nor abandoned.
        outstanding: u64,
    },
}

/// Why a watchdog sleep ended.
enum Wake {
    Elapsed,
    Finalized,
    Shutdown,
}

pub(crate) struct Watchdog {
    pub(crate) state: Arc<BatchState>,
    pub(crate) bus: Bus,
    pub(crate) index: Arc<str>,
    pub(crate) warmup: Duration,
    pub(crate) interval: Duration,
    pub(crate) max_polls: u32,
    pub(crate) finalized: CancellationToken,
    pub(crate) runtime: CancellationToken,
}

impl Watchdog {
    pub(crate) fn spawn(self) -> JoinHandle<WatchdogExit> {
        tokio::spawn(self.run())
    }

    async fn run(self) -> WatchdogExit {
        let polls = AssertUnwindSafe(self.poll())
            .catch_unwind()
            .await
            .unwrap_or(self.max_polls);
        self.exit(polls)
    }

    /// Returns the number of polls performed.
    async fn poll(&self) -> u32 {
        let mut armed = true;

        match self.pause(self.warmup, &mut armed).await {
            Wake::Shutdown | Wake::Finalized => return 0,
            Wake::Elapsed => {}
        }

        for poll in 1..=self.max_polls {
            if let Wake::Shutdown = self.pause(self.interval, &mut armed).await {
                return poll - 1;
            }

            let counts = self.state.snapshot();
            if counts.is_complete() {
                return poll;
            }

            let msg = Message::WaitingAbandoned {
                abandoned: counts.abandoned,
                in_flight: counts.in_flight(),
            };
            warn!(
                msg = msg.as_label(),
                index = %self.index,
                poll,
                abandoned = counts.abandoned,
                in_flight = counts.in_flight(),
                "{msg}"
            );
            self.bus.publish(
                Event::new(EventKind::WatchdogStall)
                    .with_index(Arc::clone(&self.index))
                    .with_counts(counts)
                    .with_attempt(poll),
            );
        }
        self.max_polls
    }

    /// Sleeps for `dur`, waking early on shutdown, or on finalize when the batch is complete.
    ///
    /// `armed` is cleared once finalize has been observed, so a finalized but
    /// incomplete batch does not spin on the already-cancelled token.
    async fn pause(&self, dur: Duration, armed: &mut bool) -> Wake {
        let sleep = time::sleep(dur);
        tokio::pin!(sleep);

        loop {
            select! {
                biased;
                _ = self.runtime.cancelled() => return Wake::Shutdown,
                _ = &mut sleep => return Wake::Elapsed,
                _ = self.finalized.cancelled(), if *armed => {
                    *armed = false;
                    if self.state.snapshot().is_complete() {
                        return Wake::Finalized;
                    }
                }
            }
        }
    }

    fn exit(&self, polls: u32) -> WatchdogExit {
        let counts = self.state.snapshot();

        if counts.is_complete() {
            let msg = Message::WorkersFinished;
            info!(msg = msg.as_label(), index = %self.index, polls, "{msg}");
            self.bus.publish(
                Event::new(EventKind::WatchdogFinished)
                    .with_index(Arc::clone(&self.index))
                    .with_counts(counts),
            );
            WatchdogExit::Finished { polls }
        } else {
            let outstanding = counts.in_flight();
            let msg = Message::WorkersNotFinished { outstanding };
            error!(
                msg = msg.as_label(),
                index = %self.index,
                outstanding,
                abandoned = counts.abandoned,
                "{msg}"
            );
            self.bus.publish(
                Event::new(EventKind::WatchdogExhausted)
                    .with_index(Arc::clone(&self.index))
                    .with_counts(counts),
            );
            WatchdogExit::Exhausted { outstanding }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watchdog(
        state: &Arc<BatchState>,
        max_polls: u32,
    ) -> (Watchdog, CancellationToken, CancellationToken) {
        let finalized = CancellationToken::new();
        let runtime = CancellationToken::new();
        let dog = Watchdog {
            state: state.clone(),
            bus: Bus::new(64),
            index: Arc::from("test"),
            warmup: Duration::from_secs(30),
            interval: Duration::from_secs(30),
            max_polls,
            finalized: finalized.clone(),
            runtime: runtime.clone(),
        };
        (dog, finalized, runtime)
    }

    #[tokio::test(start_paused = true)]
    async fn empty_batch_finishes_after_first_poll() {
        let state = BatchState::new();
        let (dog, _, _) = watchdog(&state, 20);

        let started = time::Instant::now();
        let exit = dog.spawn().await.expect("join");

        assert_eq!(exit, WatchdogExit::Finished { polls: 1 });
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(60) && elapsed < Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_worker_exhausts_budget() {
        let state = BatchState::new();
        state.record_started();
        let (dog, _, _) = watchdog(&state, 3);
        let mut rx = dog.bus.subscribe();

        let exit = dog.spawn().await.expect("join");

        assert_eq!(exit, WatchdogExit::Exhausted { outstanding: 1 });
        let mut stalls = 0;
        let mut last = None;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::WatchdogStall {
                stalls += 1;
            }
            last = Some(ev.kind);
        }
        assert_eq!(stalls, 3);
        assert_eq!(last, Some(EventKind::WatchdogExhausted));
    }

    #[tokio::test(start_paused = true)]
    async fn finalize_of_complete_batch_exits_during_warmup() {
        let state = BatchState::new();
        state.record_started();
        state.record_returned();
        let (dog, finalized, _) = watchdog(&state, 20);

        let started = time::Instant::now();
        let handle = dog.spawn();
        time::sleep(Duration::from_secs(1)).await;
        finalized.cancel();
        let exit = handle.await.expect("join");

        assert_eq!(exit, WatchdogExit::Finished { polls: 0 });
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn finalize_of_incomplete_batch_keeps_polling() {
        let state = BatchState::new();
        state.record_started();
        let (dog, finalized, _) = watchdog(&state, 2);
        finalized.cancel();

        let started = time::Instant::now();
        let exit = dog.spawn().await.expect("join");

        assert_eq!(exit, WatchdogExit::Exhausted { outstanding: 1 });
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(90) && elapsed < Duration::from_secs(91));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_falls_through_to_exit_logic() {
        let state = BatchState::new();
        state.record_started();
        let (dog, _, runtime) = watchdog(&state, 20);

        let handle = dog.spawn();
        time::sleep(Duration::from_secs(45)).await;
        runtime.cancel();

        assert_eq!(
            handle.await.expect("join"),
            WatchdogExit::Exhausted { outstanding: 1 }
        );
    }
}
