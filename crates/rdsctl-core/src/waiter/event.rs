//! Progress events emitted while waiting
//!
//! The waiter itself never prints. Callers that want to drive a spinner or
//! collect diagnostics register a callback and receive these events.

use std::sync::Arc;
use std::time::Duration;

/// Progress events emitted during a state wait
#[derive(Debug, Clone, PartialEq)]
pub enum WaitEvent {
    /// The wait has started; the first probe follows after `delay`
    Started { timeout: Duration, delay: Duration },
    /// A probe returned an object in `status`
    Polling {
        attempt: u32,
        status: String,
        elapsed: Duration,
    },
    /// A probe could not find the object
    ///
    /// `consecutive` is the current run of misses. For absence waits that
    /// run is the progress towards the target.
    NotFound {
        attempt: u32,
        consecutive: u32,
        elapsed: Duration,
    },
    /// The waiter sleeps `wait` before refreshing again
    Sleeping { attempt: u32, wait: Duration },
    /// The target was reached
    Completed { attempts: u32, elapsed: Duration },
    /// The wait ended with an error
    Failed { error: String, elapsed: Duration },
}

/// Callback type for wait progress updates
///
/// Shared so that one callback can be handed to several waits.
pub type WaitEventCallback = Arc<dyn Fn(&WaitEvent) + Send + Sync>;

/// Helper to emit progress events
pub(crate) fn emit(callback: &Option<WaitEventCallback>, event: WaitEvent) {
    if let Some(cb) = callback {
        cb(&event);
    }
}
