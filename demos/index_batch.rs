//! # Example: index_batch
//!
//! Indexes a handful of fake resources; one of them hangs and is abandoned.
//!
//! Demonstrates how to:
//! - Implement a [`Worker`] that honors its cancellation token.
//! - Build a [`Supervisor`] with a console sink and the [`LogWriter`] subscriber.
//! - Finalize the batch, report statistics and wait for the watchdog.
//!
//! ## Flow
//! ```text
//! Supervisor::builder(worker, cfg).build()
//!     ├─► launch("/srv/docs/readme.md")   ──► Completed
//!     ├─► launch("/srv/docs/huge.pdf")    ──► Abandoned (FAILED: timeout ...)
//!     ├─► launch("/srv/docs/broken.odt")  ──► Failed
//!     ├─► finalize()
//!     ├─► report_statistics()
//!     └─► join_watchdog()                 ──► Finished
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=indexvisor=debug cargo run --example index_batch --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use indexvisor::{
    ConsoleReport, IndexJob, LogWriter, Subscribe, Supervisor, SupervisorConfig, Worker,
    WorkerError,
};

/// Pretends to extract text; "huge" files take long, "broken" ones fail.
struct FakeExtractor;

#[async_trait]
impl Worker for FakeExtractor {
    type Resource = String;
    type Writer = ();
    type Index = &'static str;

    fn name(&self) -> &str {
        "fake-extractor"
    }

    async fn index(
        &self,
        job: IndexJob<String, (), &'static str>,
        ctx: CancellationToken,
    ) -> Result<(), WorkerError> {
        if job.resource.contains("broken") {
            return Err(WorkerError::fail("unsupported format"));
        }
        let work = if job.resource.contains("huge") {
            Duration::from_secs(5)
        } else {
            Duration::from_millis(200)
        };
        tokio::select! {
            _ = tokio::time::sleep(work) => Ok(()),
            _ = ctx.cancelled() => Err(WorkerError::Canceled),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cfg = SupervisorConfig {
        timeout: Duration::from_secs(1),
        watchdog_warmup: Duration::from_millis(500),
        watchdog_interval: Duration::from_millis(500),
        watchdog_max_polls: 10,
        ..SupervisorConfig::new("docs")
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];

    let sup = Supervisor::builder(Arc::new(FakeExtractor), cfg)
        .with_sink(Arc::new(ConsoleReport::new()))
        .with_subscribers(subs)
        .build();
    sup.interrupt_on_signal();

    for path in [
        "/srv/docs/readme.md",
        "/srv/docs/huge.pdf",
        "/srv/docs/broken.odt",
    ] {
        let outcome = sup
            .launch(path.to_string(), (), "docs")
            .await
            .with_context(|| format!("launching {path}"))?;
        println!("{path}: {outcome:?}");
    }

    sup.finalize();
    let stats = sup.report_statistics();
    let exit = sup.join_watchdog().await;
    println!("stats: {stats:?}, watchdog: {exit:?}");
    Ok(())
}
