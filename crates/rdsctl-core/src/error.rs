//! Unified error handling for rdsctl-core
//!
//! Wraps client, configuration and wait errors with consistent helper
//! methods.
//!
//! # Example
//!
//! ```rust
//! use rdsctl_core::CoreError;
//! use rdsctl_core::waiter::WaitError;
//!
//! let wait_err: WaitError<String> = WaitError::NotFound { retries: 21 };
//! let core_err: CoreError = wait_err.into();
//! assert!(core_err.is_not_found());
//! assert!(!core_err.is_retryable());
//! ```

use std::fmt;

use thiserror::Error;

use crate::client::ApiError;
use crate::config::ConfigError;
use crate::resource::{Operation, ResourceKind};
use crate::status::BlueGreenDeploymentStatus;
use crate::waiter::WaitError;
use crate::workflows::BlueGreenError;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error from the control-plane API
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A state wait failed; the probed object is dropped
    #[error(transparent)]
    Wait(WaitError<()>),

    /// A blue/green deployment ended in a failed status
    #[error("blue/green deployment '{id}' is {status}: {details}")]
    BlueGreenFailed {
        id: String,
        status: BlueGreenDeploymentStatus,
        details: String,
    },

    #[error("{kind} does not support waiting for {operation}")]
    Unsupported {
        kind: ResourceKind,
        operation: Operation,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl<T: fmt::Debug> From<WaitError<T>> for CoreError {
    fn from(err: WaitError<T>) -> Self {
        CoreError::Wait(err.without_object())
    }
}

impl From<BlueGreenError> for CoreError {
    fn from(err: BlueGreenError) -> Self {
        match err {
            BlueGreenError::Failed {
                id,
                status,
                details,
                ..
            } => CoreError::BlueGreenFailed {
                id,
                status,
                details,
            },
            BlueGreenError::Wait(e) => e.into(),
        }
    }
}

impl CoreError {
    /// The underlying API error, including one raised by a status probe
    fn api(&self) -> Option<&ApiError> {
        match self {
            CoreError::Api(e) => Some(e),
            CoreError::Wait(WaitError::Probe(e)) => e.downcast_ref::<ApiError>(),
            _ => None,
        }
    }

    /// Returns true if the object could not be found (not-found exhausted)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Wait(e) if e.is_not_found())
    }

    /// Returns true if the wait timed out or the HTTP request did
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Wait(e) if e.is_timeout() => true,
            _ => self.api().is_some_and(ApiError::is_timeout),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Wait(e) if e.is_cancelled())
    }

    #[must_use]
    pub fn is_unexpected_state(&self) -> bool {
        match self {
            CoreError::Wait(e) => e.is_unexpected_state(),
            CoreError::BlueGreenFailed { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.api().is_some_and(ApiError::is_unauthorized)
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Wait(e) if e.is_retryable() => true,
            _ => self.api().is_some_and(ApiError::is_retryable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_wait_error_keeps_classification() {
        let err: CoreError = WaitError::Timeout {
            timeout: Duration::from_secs(60),
            last_state: Some("creating".to_string()),
            expected: vec!["available".to_string()],
            last: Some("cluster".to_string()),
        }
        .into();

        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("last state: 'creating'"));
    }

    #[test]
    fn test_probe_api_error_is_classified() {
        let api = ApiError::Status {
            status: 401,
            message: "bad key".to_string(),
        };
        let err: CoreError = WaitError::<()>::Probe(Box::new(api)).into();

        assert!(err.is_unauthorized());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "API returned 401: bad key");
    }

    #[test]
    fn test_direct_api_error() {
        let err: CoreError = ApiError::Status {
            status: 503,
            message: "unavailable".to_string(),
        }
        .into();

        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("API error"));
    }

    #[test]
    fn test_blue_green_failure_keeps_details() {
        let err: CoreError = BlueGreenError::Failed {
            id: "bgd-1".to_string(),
            status: BlueGreenDeploymentStatus::InvalidConfiguration,
            details: "source has no backups".to_string(),
            deployment: Box::new(crate::client::BlueGreenDeployment {
                blue_green_deployment_identifier: "bgd-1".to_string(),
                status: BlueGreenDeploymentStatus::InvalidConfiguration,
                blue_green_deployment_name: None,
                source: None,
                target: None,
                status_details: Some("source has no backups".to_string()),
                create_time: None,
            }),
        }
        .into();

        assert!(err.is_unexpected_state());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "blue/green deployment 'bgd-1' is INVALID_CONFIGURATION: source has no backups"
        );
    }

    #[test]
    fn test_cancelled() {
        let err: CoreError = WaitError::<u8>::Cancelled {
            elapsed: Duration::from_secs(3),
        }
        .into();
        assert!(err.is_cancelled());
        assert!(!err.is_retryable());
    }
}
