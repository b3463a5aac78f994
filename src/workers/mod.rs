//! # Worker abstractions.
//!
//! - [`Worker`] - trait for implementing async cancelable indexing units
//! - [`WorkerFn`] - closure-backed implementation
//! - [`IndexJob`] - resource, writer and index handed to one worker
//! - [`Resource`] - identity of the content being indexed

mod worker;
mod worker_fn;

pub use worker::{IndexJob, Resource, Worker};
pub use worker_fn::WorkerFn;
