//! # Indexing worker abstraction.
//!
//! Defines the [`Worker`] trait (async, cancelable), the [`IndexJob`] handed to
//! it per launch, and the [`Resource`] identity of the content being indexed.
//!
//! A worker receives a [`CancellationToken`]. Cancellation is advisory: when
//! the supervisor abandons a worker it cancels the token, and the worker is
//! expected to stop at its next checkpoint. The supervisor never force-stops it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;

/// Identity of a content resource being indexed.
pub trait Resource: Send + Sync + 'static {
    /// Root path (or other stable identifier) used in logs and in the progress sink.
    fn root_path(&self) -> &str;
}

impl Resource for String {
    fn root_path(&self) -> &str {
        self
    }
}

impl Resource for &'static str {
    fn root_path(&self) -> &str {
        self
    }
}

impl Resource for Arc<str> {
    fn root_path(&self) -> &str {
        self
    }
}

/// Everything one worker needs to index one resource.
#[derive(Debug, Clone)]
pub struct IndexJob<R, W, I> {
    /// The resource to index.
    pub resource: R,
    /// Write target of the index (e.g. an index writer handle).
    pub writer: W,
    /// The index the resource belongs to.
    pub index: I,
}

/// # Asynchronous, cancelable indexing unit.
///
/// One call to [`index`](Worker::index) indexes one resource. The supervisor
/// invokes it once per [`launch`](crate::Supervisor::launch), each time on a
/// fresh tokio task with a fresh cancellation token.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use indexvisor::{IndexJob, Worker, WorkerError};
///
/// struct PlainText;
///
/// #[async_trait]
/// impl Worker for PlainText {
///     type Resource = String;
///     type Writer = ();
///     type Index = &'static str;
///
///     async fn index(
///         &self,
///         job: IndexJob<String, (), &'static str>,
///         ctx: CancellationToken,
///     ) -> Result<(), WorkerError> {
///         if ctx.is_cancelled() {
///             return Err(WorkerError::Canceled);
///         }
///         // extract text from job.resource, add it through job.writer...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Resource identity.
    type Resource: Resource;
    /// Index write target.
    type Writer: Send + 'static;
    /// Index handle.
    type Index: Send + 'static;

    /// Returns a stable, human-readable worker name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Indexes one resource.
    ///
    /// Implementations should check `ctx.is_cancelled()` between expensive steps
    /// and return [`WorkerError::Canceled`] promptly once it is set.
    async fn index(
        &self,
        job: IndexJob<Self::Resource, Self::Writer, Self::Index>,
        ctx: CancellationToken,
    ) -> Result<(), WorkerError>;
}
