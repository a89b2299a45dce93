// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for hosting adapters

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Rate limited: quota resets at epoch {0}")]
    RateLimited(u64),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Hosting API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse classification used by callers that only care about how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity absent (repository, file, folder)
    NotFound,
    /// Quota exhausted; never retried internally
    RateLimited,
    /// Anything else: transport, decoding, unexpected status
    Transport,
}

impl AdapterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::NotFound(_) => ErrorKind::NotFound,
            AdapterError::RateLimited(_) => ErrorKind::RateLimited,
            _ => ErrorKind::Transport,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind() == ErrorKind::RateLimited
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            AdapterError::NotFound("owner/repo".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(AdapterError::RateLimited(0).kind(), ErrorKind::RateLimited);
        assert_eq!(
            AdapterError::ApiError("HTTP 500".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            AdapterError::ConfigError("bad token".into()).kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn test_display_messages() {
        let err = AdapterError::NotFound("owner/repo".into());
        assert_eq!(err.to_string(), "Resource not found: owner/repo");
        assert!(AdapterError::RateLimited(1700000000)
            .to_string()
            .contains("1700000000"));
    }
}
