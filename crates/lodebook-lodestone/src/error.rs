//! Lodestone source error types.
//!
//! Errors carry a transient/permanent classification so the daemon can log
//! a degraded upstream differently from a misconfiguration; the cycle
//! itself never retries either way.

use thiserror::Error;

use lodebook_core::error::SyncError;

/// Error from the Lodestone community API client.
#[derive(Debug, Error)]
pub enum LodestoneError {
    /// Transport-level failure (connect, timeout, decode).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status from the API.
    #[error("lodestone api returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response parsed but did not contain what was expected.
    #[error("unexpected payload: {message}")]
    Payload { message: String },

    /// Client configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl LodestoneError {
    /// Create a payload error.
    pub fn payload(message: impl Into<String>) -> Self {
        LodestoneError::Payload {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        LodestoneError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Whether the error is transient and a later cycle may succeed
    /// without intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            LodestoneError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LodestoneError::Status { status, .. } => *status == 429 || *status >= 500,
            LodestoneError::Payload { .. } | LodestoneError::InvalidConfiguration { .. } => false,
        }
    }
}

impl From<LodestoneError> for SyncError {
    fn from(err: LodestoneError) -> Self {
        SyncError::source_fetch(err.to_string())
    }
}

/// Result type for Lodestone client operations.
pub type LodestoneResult<T> = Result<T, LodestoneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        assert!(LodestoneError::Status {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(LodestoneError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!LodestoneError::Status {
            status: 404,
            body: String::new()
        }
        .is_transient());
    }

    #[test]
    fn test_config_and_payload_are_permanent() {
        assert!(!LodestoneError::invalid_configuration("no base url").is_transient());
        assert!(!LodestoneError::payload("no member array").is_transient());
    }

    #[test]
    fn test_converts_into_source_fetch() {
        let err: SyncError = LodestoneError::payload("truncated").into();
        assert!(matches!(err, SyncError::SourceFetch { .. }));
        assert!(err.aborts_before_mutation());
    }
}
