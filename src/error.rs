//! Error types used by the supervisor and by indexing workers.
//!
//! This module defines two enums:
//!
//! - [`SupervisorError`]: a `launch` was refused because the batch no longer accepts tasks.
//! - [`WorkerError`]: failures raised by one indexing worker.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logs and events.
//! Timeouts are deliberately absent: an expired deadline is an expected outcome
//! ([`LaunchOutcome::Abandoned`](crate::LaunchOutcome::Abandoned)), never an error.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by the supervisor itself.
///
/// Returned by [`Supervisor::launch`](crate::Supervisor::launch) when its
/// precondition ("the batch accepts tasks") does not hold.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// The driver already called [`Supervisor::finalize`](crate::Supervisor::finalize).
    #[error("batch for index '{index}' is finalized; no more tasks accepted")]
    BatchFinalized {
        /// Name of the index the batch belongs to.
        index: String,
    },

    /// The supervisor was interrupted (explicitly or by an OS signal).
    #[error("supervisor for index '{index}' was interrupted")]
    ShutDown {
        /// Name of the index the batch belongs to.
        index: String,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use indexvisor::SupervisorError;
    ///
    /// let err = SupervisorError::BatchFinalized { index: "docs".into() };
    /// assert_eq!(err.as_label(), "supervisor_batch_finalized");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::BatchFinalized { .. } => "supervisor_batch_finalized",
            SupervisorError::ShutDown { .. } => "supervisor_shut_down",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::BatchFinalized { index } => format!("finalized: index={index}"),
            SupervisorError::ShutDown { index } => format!("shut down: index={index}"),
        }
    }
}

/// # Errors produced by an indexing worker.
///
/// A failing worker still counts as *returned*: it finished and reported back,
/// it just did not index anything useful.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Extraction or index writing failed.
    #[error("indexing failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The worker observed its cancellation token and stopped early.
    #[error("indexing cancelled")]
    Canceled,

    /// The worker panicked; the panic was caught by the unit runner.
    #[error("worker panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        WorkerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use indexvisor::WorkerError;
    ///
    /// assert_eq!(WorkerError::Canceled.as_label(), "worker_canceled");
    /// assert_eq!(WorkerError::fail("bad pdf").as_label(), "worker_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Canceled => "worker_canceled",
            WorkerError::Panicked { .. } => "worker_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Fail { error } => format!("error: {error}"),
            WorkerError::Canceled => "cancelled".to_string(),
            WorkerError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let finalized = SupervisorError::BatchFinalized {
            index: "docs".into(),
        };
        let shut = SupervisorError::ShutDown {
            index: "docs".into(),
        };
        assert_eq!(finalized.as_label(), "supervisor_batch_finalized");
        assert_eq!(shut.as_label(), "supervisor_shut_down");
        assert_eq!(
            WorkerError::Panicked { info: "x".into() }.as_label(),
            "worker_panicked"
        );
    }

    #[test]
    fn display_includes_details() {
        let err = WorkerError::fail("corrupt stream");
        assert_eq!(err.to_string(), "indexing failed: corrupt stream");
        assert_eq!(err.as_message(), "error: corrupt stream");

        let err = SupervisorError::BatchFinalized {
            index: "offline".into(),
        };
        assert!(err.to_string().contains("'offline'"));
    }

    #[test]
    fn panic_message_downcasts_common_payloads() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
