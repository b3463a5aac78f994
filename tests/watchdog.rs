//! Watchdog scenarios: exhaustion while a worker hangs, early exit on finalize.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use indexvisor::{
    EventKind, IndexJob, LaunchOutcome, MemoryReport, Supervisor, SupervisorConfig,
    WatchdogExit, WorkerError, WorkerFn,
};

type Job = IndexJob<String, (), ()>;

fn cfg(timeout: Duration) -> SupervisorConfig {
    SupervisorConfig {
        timeout,
        watchdog_warmup: Duration::from_millis(10),
        watchdog_interval: Duration::from_millis(10),
        watchdog_max_polls: 5,
        ..SupervisorConfig::new("docs")
    }
}

#[tokio::test(start_paused = true)]
async fn hanging_worker_exhausts_the_watchdog() {
    let worker = WorkerFn::arc("hang", |_job: Job, _ctx: CancellationToken| async {
        pending::<()>().await;
        Ok::<(), WorkerError>(())
    });
    let sup = Supervisor::builder(worker, cfg(Duration::from_secs(1))).build();
    let mut rx = sup.subscribe();

    let (out, exit) = tokio::join!(
        sup.launch("/srv/stuck".into(), (), ()),
        sup.join_watchdog()
    );

    assert_eq!(out, Ok(LaunchOutcome::Abandoned));
    assert_eq!(exit, Some(WatchdogExit::Exhausted { outstanding: 1 }));
    assert_eq!(sup.join_watchdog().await, None);

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    let stalls = kinds
        .iter()
        .filter(|k| **k == EventKind::WatchdogStall)
        .count();
    assert_eq!(stalls, 5);
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::WatchdogExhausted).count(),
        1
    );
    let exhausted_at = kinds
        .iter()
        .position(|k| *k == EventKind::WatchdogExhausted)
        .expect("exhausted event");
    let abandoned_at = kinds
        .iter()
        .position(|k| *k == EventKind::TaskAbandoned)
        .expect("abandoned event");
    assert!(exhausted_at < abandoned_at);
}

#[tokio::test(start_paused = true)]
async fn finalized_complete_batch_stops_the_watchdog_early() {
    let worker = WorkerFn::arc("quick", |_job: Job, _ctx: CancellationToken| async {
        time::sleep(Duration::from_millis(5)).await;
        Ok::<(), WorkerError>(())
    });
    let report = Arc::new(MemoryReport::new());
    let sup = Supervisor::new(worker, report, Duration::from_secs(1), "docs");

    let started = time::Instant::now();
    sup.launch("/srv/a".into(), (), ()).await.unwrap();
    sup.finalize();

    assert_eq!(
        sup.join_watchdog().await,
        Some(WatchdogExit::Finished { polls: 0 })
    );
    assert!(started.elapsed() < sup.config().watchdog_warmup);
}

#[tokio::test(start_paused = true)]
async fn interrupted_watchdog_still_reports() {
    let worker = WorkerFn::arc("hang", |_job: Job, _ctx: CancellationToken| async {
        pending::<()>().await;
        Ok::<(), WorkerError>(())
    });
    let sup = Supervisor::builder(worker, cfg(Duration::from_secs(60))).build();

    let pending_launch = {
        let sup = Arc::clone(&sup);
        tokio::spawn(async move { sup.launch("/srv/big".into(), (), ()).await })
    };
    time::sleep(Duration::from_millis(15)).await;
    sup.interrupt();

    assert_eq!(
        pending_launch.await.expect("join"),
        Ok(LaunchOutcome::Interrupted)
    );
    assert_eq!(
        sup.join_watchdog().await,
        Some(WatchdogExit::Exhausted { outstanding: 1 })
    );
}
