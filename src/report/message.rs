//! # Keyed report and log messages.
//!
//! A [`Message`] is a message key plus its positional parameters. The key
//! ([`Message::as_label`]) is stable and can be used by a sink to look up a
//! localized bundle; [`Display`](std::fmt::Display) renders the default English text.

use std::fmt;
use std::sync::Arc;

/// Message emitted to the progress sink and to the log.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Marker printed in front of a failure line.
    Failed,

    /// A worker exceeded its deadline and was abandoned.
    IndexingTimeout {
        /// Root path of the resource.
        resource: Arc<str>,
    },

    /// A worker returned with an error.
    WorkerFailed {
        /// Root path of the resource.
        resource: Arc<str>,
        /// Error rendered as text.
        error: String,
    },

    /// Headline closing an indexing run.
    IndexingEnd,

    /// Final batch statistics.
    IndexingStats {
        /// Workers launched.
        started: u64,
        /// Workers that reported completion.
        returned: u64,
        /// Workers given up on.
        abandoned: u64,
        /// Human-readable runtime, as produced by the sink.
        runtime: String,
    },

    /// Watchdog poll found tasks still running.
    WaitingAbandoned {
        /// Workers given up on so far.
        abandoned: u64,
        /// Workers neither returned nor abandoned.
        in_flight: u64,
    },

    /// Watchdog saw every task finish.
    WorkersFinished,

    /// Watchdog exhausted its budget with tasks outstanding.
    WorkersNotFinished {
        /// Workers neither returned nor abandoned.
        outstanding: u64,
    },
}

impl Message {
    /// Returns the stable message key.
    ///
    /// # Example
    /// ```
    /// use indexvisor::Message;
    ///
    /// assert_eq!(Message::IndexingEnd.as_label(), "rpt_indexing_end");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Message::Failed => "rpt_failed",
            Message::IndexingTimeout { .. } => "rpt_indexing_timeout",
            Message::WorkerFailed { .. } => "rpt_worker_failed",
            Message::IndexingEnd => "rpt_indexing_end",
            Message::IndexingStats { .. } => "rpt_indexing_stats",
            Message::WaitingAbandoned { .. } => "log_waiting_abandoned",
            Message::WorkersFinished => "log_workers_finished",
            Message::WorkersNotFinished { .. } => "log_workers_not_finished",
        }
    }

    /// Returns the positional parameters, in key order.
    pub fn args(&self) -> Vec<String> {
        match self {
            Message::Failed | Message::IndexingEnd | Message::WorkersFinished => Vec::new(),
            Message::IndexingTimeout { resource } => vec![resource.to_string()],
            Message::WorkerFailed { resource, error } => {
                vec![resource.to_string(), error.clone()]
            }
            Message::IndexingStats {
                started,
                returned,
                abandoned,
                runtime,
            } => vec![
                started.to_string(),
                returned.to_string(),
                abandoned.to_string(),
                runtime.clone(),
            ],
            Message::WaitingAbandoned {
                abandoned,
                in_flight,
            } => vec![abandoned.to_string(), in_flight.to_string()],
            Message::WorkersNotFinished { outstanding } => vec![outstanding.to_string()],
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Failed => f.write_str("FAILED: "),
            Message::IndexingTimeout { resource } => {
                write!(f, "timeout while indexing \"{resource}\", abandoning worker")
            }
            Message::WorkerFailed { resource, error } => {
                write!(f, "error while indexing \"{resource}\": {error}")
            }
            Message::IndexingEnd => f.write_str("Indexing finished"),
            Message::IndexingStats {
                started,
                returned,
                abandoned,
                runtime,
            } => write!(
                f,
                "{started} resources started, {returned} returned, {abandoned} abandoned, runtime {runtime}"
            ),
            Message::WaitingAbandoned {
                abandoned,
                in_flight,
            } => write!(
                f,
                "waiting for workers: {abandoned} abandoned, {in_flight} still running"
            ),
            Message::WorkersFinished => f.write_str("all indexing workers finished"),
            Message::WorkersNotFinished { outstanding } => {
                write!(f, "{outstanding} indexing workers did not finish")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_message_renders_all_parameters() {
        let msg = Message::IndexingStats {
            started: 5,
            returned: 4,
            abandoned: 1,
            runtime: "00:00:02".into(),
        };
        assert_eq!(
            msg.to_string(),
            "5 resources started, 4 returned, 1 abandoned, runtime 00:00:02"
        );
        assert_eq!(msg.args(), vec!["5", "4", "1", "00:00:02"]);
    }

    #[test]
    fn timeout_message_names_the_resource() {
        let msg = Message::IndexingTimeout {
            resource: Arc::from("/sites/default/big.pdf"),
        };
        assert_eq!(msg.as_label(), "rpt_indexing_timeout");
        assert!(msg.to_string().contains("/sites/default/big.pdf"));
    }

    #[test]
    fn parameterless_messages_have_no_args() {
        assert!(Message::Failed.args().is_empty());
        assert!(Message::WorkersFinished.args().is_empty());
    }
}
