//! Generic resource state waiter
//!
//! Polls a [`Refresh`] source until the observed status enters a target set,
//! the object disappears, a budget runs out, or the caller cancels.

mod conf;
mod error;
mod event;
mod refresh;

pub use conf::{DEFAULT_CONTINUOUS_TARGET_OCCURRENCE, DEFAULT_NOT_FOUND_CHECKS, StateChangeConf};
pub use error::{WaitError, WaitResult};
pub use event::{WaitEvent, WaitEventCallback};
pub use refresh::{
    BoxError, ChannelClosed, Probe, ProbeResult, Refresh, ResourceStatus, WatchRefresh,
};
