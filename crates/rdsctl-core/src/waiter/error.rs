//! Error taxonomy for state waits

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::refresh::BoxError;

/// Why a wait stopped without reaching its target
///
/// `T` is the probed object. Variants that observed the object carry it so
/// callers can report the last known remote state.
#[derive(Error, Debug)]
pub enum WaitError<T: fmt::Debug> {
    /// The target state was not reached (or sustained) within the timeout
    #[error(
        "timeout while waiting for state to become '{}' (last state: '{}', timeout: {timeout:?})",
        .expected.join(", "),
        .last_state.as_deref().unwrap_or_default()
    )]
    Timeout {
        timeout: Duration,
        last_state: Option<String>,
        expected: Vec<String>,
        last: Option<T>,
    },

    /// The object reported a status outside both the pending and target sets
    #[error("unexpected state '{state}', wanted target '{}'", .expected.join(", "))]
    UnexpectedState {
        state: String,
        expected: Vec<String>,
        object: T,
    },

    /// The object could not be found more times than tolerated
    #[error("couldn't find resource ({retries} retries)")]
    NotFound { retries: u32 },

    /// The probe itself failed; the error is passed through as-is
    #[error(transparent)]
    Probe(BoxError),

    /// The wait was cancelled from outside
    #[error("wait cancelled after {elapsed:?}")]
    Cancelled { elapsed: Duration },

    /// The wait was configured in a way that can never succeed
    #[error("invalid wait configuration: {0}")]
    InvalidConfig(String),
}

/// Result of a state wait
pub type WaitResult<T> = std::result::Result<T, WaitError<T>>;

impl<T: fmt::Debug> WaitError<T> {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    #[must_use]
    pub fn is_unexpected_state(&self) -> bool {
        matches!(self, WaitError::UnexpectedState { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, WaitError::NotFound { .. })
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }

    /// Returns true if waiting again could plausibly succeed
    ///
    /// Only a timeout qualifies: the object was still pending. Probe errors
    /// are left to the caller's own retry policy.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.is_timeout()
    }

    /// The status the object was last seen in, if any
    pub fn last_state(&self) -> Option<&str> {
        match self {
            WaitError::Timeout { last_state, .. } => last_state.as_deref(),
            WaitError::UnexpectedState { state, .. } => Some(state),
            _ => None,
        }
    }

    /// The object from the last successful probe, if the error carries one
    pub fn last_object(&self) -> Option<&T> {
        match self {
            WaitError::Timeout { last, .. } => last.as_ref(),
            WaitError::UnexpectedState { object, .. } => Some(object),
            _ => None,
        }
    }

    pub fn into_last_object(self) -> Option<T> {
        match self {
            WaitError::Timeout { last, .. } => last,
            WaitError::UnexpectedState { object, .. } => Some(object),
            _ => None,
        }
    }

    /// Drop the carried object, keeping classification and message
    pub fn without_object(self) -> WaitError<()> {
        match self {
            WaitError::Timeout {
                timeout,
                last_state,
                expected,
                last,
            } => WaitError::Timeout {
                timeout,
                last_state,
                expected,
                last: last.map(|_| ()),
            },
            WaitError::UnexpectedState {
                state, expected, ..
            } => WaitError::UnexpectedState {
                state,
                expected,
                object: (),
            },
            WaitError::NotFound { retries } => WaitError::NotFound { retries },
            WaitError::Probe(e) => WaitError::Probe(e),
            WaitError::Cancelled { elapsed } => WaitError::Cancelled { elapsed },
            WaitError::InvalidConfig(msg) => WaitError::InvalidConfig(msg),
        }
    }
}
