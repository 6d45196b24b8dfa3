//! Error types for rdsctl
//!
//! Command failures are mapped onto a small set of user-facing categories,
//! each with suggestions for what to try next.

use colored::Colorize;
use rdsctl_core::client::ApiError;
use rdsctl_core::config::{API_URL_ENV, ConfigError};
use rdsctl_core::CoreError;
use rdsctl_core::waiter::WaitError;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// ```text
/// error: timeout while waiting for state to become 'available' (...)
///
///   tip: raise the timeout: rdsctl wait ... --timeout <secs>
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<String>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for tip in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", tip);
        }
    }
}

/// Main error type for the rdsctl application
#[derive(Error, Debug)]
pub enum RdsCtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured and no API URL given")]
    NoProfileConfigured,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("{kind} '{id}' not found")]
    ResourceNotFound { kind: String, id: String },

    #[error("{message}")]
    Timeout { message: String },

    #[error("{message}")]
    UnexpectedState { message: String },

    #[error("{message}")]
    WaitFailed { message: String },

    #[error("Interrupted: {message}")]
    Cancelled { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for rdsctl operations
pub type Result<T> = std::result::Result<T, RdsCtlError>;

impl RdsCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            RdsCtlError::ProfileNotFound { .. } => vec![
                "List available profiles: rdsctl profile list".to_string(),
                "Check profile name spelling".to_string(),
            ],
            RdsCtlError::NoProfileConfigured => vec![
                concat!(
                    "Add a [profiles.<name>] section with api_url to the file shown by: ",
                    "rdsctl profile path"
                )
                .to_string(),
                format!("Or pass --api-url, or set {}", API_URL_ENV),
            ],
            RdsCtlError::AuthenticationFailed { .. } => vec![
                "Check the api_key of your profile: rdsctl profile show".to_string(),
                "Verify RDSCTL_API_KEY if it is set".to_string(),
            ],
            RdsCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL: rdsctl profile show".to_string(),
            ],
            RdsCtlError::Timeout { .. } => vec![
                "The resource may still be settling; run the same wait again".to_string(),
                "Raise the budget with --timeout <secs>".to_string(),
            ],
            RdsCtlError::UnexpectedState { .. } => vec![
                "Inspect the resource: rdsctl describe <kind> <id>".to_string(),
            ],
            RdsCtlError::ResourceNotFound { .. } => vec![
                "Verify the resource ID is correct".to_string(),
                "Check that you're using the correct profile".to_string(),
            ],
            RdsCtlError::InvalidInput { .. } => {
                vec!["Check the command syntax: rdsctl <command> --help".to_string()]
            }
            _ => vec![],
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RdsCtlError::Cancelled { .. } => 130,
            _ => 1,
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }

        diag.print();
    }
}

impl From<ConfigError> for RdsCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => RdsCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => RdsCtlError::NoProfileConfigured,
            other => RdsCtlError::Config(other.to_string()),
        }
    }
}

impl From<ApiError> for RdsCtlError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            return RdsCtlError::AuthenticationFailed {
                message: err.to_string(),
            };
        }
        match err {
            ApiError::Http(e) if e.is_connect() || e.is_timeout() => {
                RdsCtlError::ConnectionError {
                    message: e.to_string(),
                }
            }
            ApiError::InvalidId { .. } | ApiError::InvalidUrl { .. } => {
                RdsCtlError::InvalidInput {
                    message: err.to_string(),
                }
            }
            other => RdsCtlError::ApiError {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for RdsCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(e) => e.into(),
            CoreError::Config(e) => e.into(),
            CoreError::Wait(WaitError::Probe(e)) => match e.downcast::<ApiError>() {
                Ok(api) => (*api).into(),
                Err(other) => RdsCtlError::WaitFailed {
                    message: other.to_string(),
                },
            },
            CoreError::Wait(e) => {
                let message = e.to_string();
                if e.is_timeout() {
                    RdsCtlError::Timeout { message }
                } else if e.is_unexpected_state() {
                    RdsCtlError::UnexpectedState { message }
                } else if e.is_cancelled() {
                    RdsCtlError::Cancelled { message }
                } else {
                    RdsCtlError::WaitFailed { message }
                }
            }
            CoreError::BlueGreenFailed { .. } => RdsCtlError::UnexpectedState {
                message: err.to_string(),
            },
            CoreError::Unsupported { .. } => RdsCtlError::InvalidInput {
                message: err.to_string(),
            },
            CoreError::Serialization(e) => RdsCtlError::OutputError {
                message: e.to_string(),
            },
        }
    }
}

impl From<anyhow::Error> for RdsCtlError {
    fn from(err: anyhow::Error) -> Self {
        RdsCtlError::OutputError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_wait_timeout_maps_to_timeout() {
        let core: CoreError = WaitError::Timeout {
            timeout: Duration::from_secs(5),
            last_state: Some("creating".to_string()),
            expected: vec!["available".to_string()],
            last: None::<()>,
        }
        .into();

        let err = RdsCtlError::from(core);

        assert!(matches!(err, RdsCtlError::Timeout { .. }));
        assert!(err.to_string().starts_with("timeout while waiting"));
        assert!(!err.suggestions().is_empty());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_cancelled_exit_code() {
        let core: CoreError = WaitError::<()>::Cancelled {
            elapsed: Duration::from_secs(1),
        }
        .into();
        assert_eq!(RdsCtlError::from(core).exit_code(), 130);
    }

    #[test]
    fn test_probe_auth_error_is_unwrapped() {
        let api = ApiError::Status {
            status: 403,
            message: "forbidden".to_string(),
        };
        let core: CoreError = WaitError::<()>::Probe(Box::new(api)).into();

        assert!(matches!(
            RdsCtlError::from(core),
            RdsCtlError::AuthenticationFailed { .. }
        ));
    }

    #[test]
    fn test_blue_green_failure_is_unexpected_state() {
        let core = CoreError::BlueGreenFailed {
            id: "bgd-1".to_string(),
            status: "SWITCHOVER_FAILED".into(),
            details: "replica lag too high".to_string(),
        };

        let err = RdsCtlError::from(core);

        assert!(matches!(err, RdsCtlError::UnexpectedState { .. }));
        assert!(err.to_string().contains("replica lag too high"));
    }

    #[test]
    fn test_no_profiles_suggests_api_url() {
        let err: RdsCtlError = ConfigError::NoProfiles { env: API_URL_ENV }.into();
        assert!(matches!(err, RdsCtlError::NoProfileConfigured));
        assert!(err.suggestions().iter().any(|s| s.contains("--api-url")));
    }
}
