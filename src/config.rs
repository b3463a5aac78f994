//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`], the settings of one indexing batch.
//!
//! ## Sentinel values
//! - `timeout = 0s` → no per-task deadline (the launch waits for the worker)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Configuration for one [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `index_name`: name of the index being built (used in logs, events and errors)
/// - `timeout`: per-task deadline before a worker is abandoned (`0s` = none)
/// - `watchdog_warmup`: grace period before the watchdog's first check
/// - `watchdog_interval`: pause between two watchdog checks
/// - `watchdog_max_polls`: number of checks before the watchdog gives up
/// - `bus_capacity`: event bus ring buffer size (min 1)
///
/// The watchdog lifetime is bounded by `warmup + interval * max_polls`,
/// independent of the batch size.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Name of the index this batch builds.
    pub index_name: String,

    /// Per-task wall-clock deadline.
    ///
    /// - `Duration::ZERO` = no deadline
    /// - `> 0` = the worker is abandoned and signalled to cancel once elapsed
    pub timeout: Duration,

    /// Sleep before the watchdog's first check.
    pub watchdog_warmup: Duration,

    /// Sleep between two watchdog checks.
    pub watchdog_interval: Duration,

    /// Maximum number of watchdog checks.
    pub watchdog_max_polls: u32,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Receivers lagging more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Creates a default configuration for the named index.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            ..Self::default()
        }
    }

    /// Returns the per-task deadline as an `Option`.
    ///
    /// - `None` → no deadline
    /// - `Some(d)` → workers still running after `d` are abandoned
    #[inline]
    pub fn task_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Upper bound on the watchdog lifetime.
    pub fn watchdog_budget(&self) -> Duration {
        self.watchdog_warmup
            .saturating_add(self.watchdog_interval.saturating_mul(self.watchdog_max_polls))
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `index_name = "default"`
    /// - `timeout = 60s`
    /// - `watchdog_warmup = 30s`, `watchdog_interval = 30s`, `watchdog_max_polls = 20`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            index_name: "default".to_string(),
            timeout: Duration::from_secs(60),
            watchdog_warmup: Duration::from_secs(30),
            watchdog_interval: Duration::from_secs(30),
            watchdog_max_polls: 20,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_no_deadline() {
        let mut cfg = SupervisorConfig::new("docs");
        assert_eq!(cfg.task_timeout(), Some(Duration::from_secs(60)));

        cfg.timeout = Duration::ZERO;
        assert_eq!(cfg.task_timeout(), None);
    }

    #[test]
    fn bus_capacity_never_zero() {
        let cfg = SupervisorConfig {
            bus_capacity: 0,
            ..SupervisorConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn default_watchdog_budget_is_bounded() {
        let cfg = SupervisorConfig::default();
        assert_eq!(cfg.index_name, "default");
        assert_eq!(cfg.watchdog_budget(), Duration::from_secs(30 + 30 * 20));
    }
}
