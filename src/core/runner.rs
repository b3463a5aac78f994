//! # Run one worker unit.
//!
//! Spawns one [`Worker::index`] call as an independent tokio task and returns
//! a [`UnitHandle`]: the unit's cancellation token plus its join handle.
//!
//! ```text
//! spawn_unit(worker, job, completion)
//!   ├─► token = CancellationToken::new()      (not linked to the supervisor)
//!   └─► tokio::spawn {
//!         res = catch_unwind(worker.index(job, token))
//!         completion.complete()               (exactly once, any outcome)
//!         res
//!       }
//! ```
//!
//! ## Rules
//! - The completion callback runs **before** the spawned task finishes, so a
//!   caller that joined the handle observes the updated `returned` counter.
//! - Panics are caught and surfaced as [`WorkerError::Panicked`].
//! - Cancelling the token is advisory; the unit keeps running until the
//!   worker itself returns.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::state::Completion;
use crate::error::{WorkerError, panic_message};
use crate::workers::{IndexJob, Worker};

/// Handle to one running worker unit.
pub(crate) struct UnitHandle {
    /// Cooperative cancellation signal for the worker.
    pub(crate) token: CancellationToken,
    /// Resolves once the worker returned and reported completion.
    pub(crate) done: JoinHandle<Result<(), WorkerError>>,
}

/// Spawns `worker` on `job`; `completion` is invoked once the worker returns.
pub(crate) fn spawn_unit<W: Worker>(
    worker: Arc<W>,
    job: IndexJob<W::Resource, W::Writer, W::Index>,
    completion: Completion,
) -> UnitHandle {
    let token = CancellationToken::new();
    let ctx = token.clone();

    let done = tokio::spawn(async move {
        let res = match AssertUnwindSafe(worker.index(job, ctx)).catch_unwind().await {
            Ok(res) => res,
            Err(payload) => Err(WorkerError::Panicked {
                info: panic_message(payload.as_ref()),
            }),
        };
        completion.complete();
        res
    });

    UnitHandle { token, done }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::state::BatchState;
    use crate::events::Bus;
    use crate::workers::WorkerFn;

    fn completion(state: &Arc<BatchState>) -> Completion {
        Completion::new(state.clone(), Bus::new(8), Arc::from("idx"), Arc::from("/r"))
    }

    fn job() -> IndexJob<String, (), ()> {
        IndexJob {
            resource: "/r".to_string(),
            writer: (),
            index: (),
        }
    }

    #[tokio::test]
    async fn completion_is_visible_after_join() {
        let state = BatchState::new();
        let worker = WorkerFn::arc("ok", |_job: IndexJob<String, (), ()>, _ctx| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<(), WorkerError>(())
        });

        let unit = spawn_unit(worker, job(), completion(&state));
        let res = unit.done.await.expect("join");

        assert!(res.is_ok());
        assert_eq!(state.snapshot().returned, 1);
    }

    #[tokio::test]
    async fn panic_still_reports_completion() {
        let state = BatchState::new();
        let worker = WorkerFn::arc("boom", |_job: IndexJob<String, (), ()>, _ctx| async {
            if true {
                panic!("parser exploded");
            }
            Ok::<(), WorkerError>(())
        });

        let unit = spawn_unit(worker, job(), completion(&state));
        let res = unit.done.await.expect("join");

        assert_eq!(
            res,
            Err(WorkerError::Panicked {
                info: "parser exploded".into()
            })
        );
        assert_eq!(state.snapshot().returned, 1);
    }

    #[tokio::test]
    async fn worker_observes_cancellation() {
        let state = BatchState::new();
        let worker = WorkerFn::arc(
            "cooperative",
            |_job: IndexJob<String, (), ()>, ctx: CancellationToken| async move {
                ctx.cancelled().await;
                Err(WorkerError::Canceled)
            },
        );

        let unit = spawn_unit(worker, job(), completion(&state));
        unit.token.cancel();
        let res = unit.done.await.expect("join");

        assert_eq!(res, Err(WorkerError::Canceled));
        assert_eq!(state.snapshot().returned, 1);
    }
}
