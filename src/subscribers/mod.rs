//! # Event subscribers.
//!
//! - [`Subscribe`] is the extension trait for custom handlers.
//! - [`SubscriberSet`] fans events out to per-subscriber queues.
//! - [`InFlightTracker`] keeps the set of resources still running.
//! - [`LogWriter`] prints events to stdout (feature `logging`).

mod in_flight;
#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

pub use in_flight::InFlightTracker;
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
