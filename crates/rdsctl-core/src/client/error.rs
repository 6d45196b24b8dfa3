//! Errors returned by the control-plane describe client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid resource id '{id}': {reason}")]
    InvalidId { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true for 401/403
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401 | 403))
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status_code() == Some(429)
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(500..=599))
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_timeout())
    }

    /// Returns true if repeating the request could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => self.is_server_error() || self.is_rate_limited(),
        }
    }
}
