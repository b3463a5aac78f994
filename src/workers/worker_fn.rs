//! # Function-backed worker (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn(IndexJob, CancellationToken) -> Fut`,
//! producing a fresh future per launch. Shared state goes into an explicit
//! `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use indexvisor::{IndexJob, WorkerError, WorkerFn};
//!
//! let w = WorkerFn::arc("noop", |_job: IndexJob<String, (), ()>, ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(WorkerError::Canceled);
//!     }
//!     Ok(())
//! });
//! assert_eq!(indexvisor::Worker::name(w.as_ref()), "noop");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::workers::worker::{IndexJob, Resource, Worker};

/// Function-backed worker implementation.
pub struct WorkerFn<R, W, I, F> {
    name: Cow<'static, str>,
    f: F,
    _job: PhantomData<fn(R, W, I)>,
}

impl<R, W, I, F> WorkerFn<R, W, I, F> {
    /// Creates a new function-backed worker.
    pub fn new<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(IndexJob<R, W, I>, CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), WorkerError>>,
    {
        Self {
            name: name.into(),
            f,
            _job: PhantomData,
        }
    }

    /// Creates the worker and returns it behind an `Arc`.
    pub fn arc<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self>
    where
        F: Fn(IndexJob<R, W, I>, CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), WorkerError>>,
    {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<R, W, I, F, Fut> Worker for WorkerFn<R, W, I, F>
where
    R: Resource,
    W: Send + 'static,
    I: Send + 'static,
    F: Fn(IndexJob<R, W, I>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    type Resource = R;
    type Writer = W;
    type Index = I;

    fn name(&self) -> &str {
        &self.name
    }

    async fn index(
        &self,
        job: IndexJob<R, W, I>,
        ctx: CancellationToken,
    ) -> Result<(), WorkerError> {
        (self.f)(job, ctx).await
    }
}
