//! Cycle error taxonomy.
//!
//! Error definitions for the reconciliation cycle, classified by where in
//! the cycle they occur and whether any writes may have happened.

use thiserror::Error;

/// Error that can abort a reconciliation cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Upstream roster fetch failed. Nothing was written; the cycle is
    /// retried on the next scheduled trigger.
    #[error("roster fetch failed: {message}")]
    SourceFetch { message: String },

    /// Loading the archived snapshot failed. Nothing was written.
    #[error("archived snapshot load failed: {message}")]
    ArchiveLoad { message: String },

    /// The fresh roster is below the minimum-size floor. A degraded fetch
    /// must not be mistaken for a mass departure, so the cycle aborts
    /// before any classification or write.
    #[error("fresh roster has {observed} members, below the minimum of {required}")]
    DataQuality { observed: usize, required: usize },

    /// A batch write failed. Batches committed earlier in the same cycle
    /// stay committed; the next cycle reclassifies whatever remains.
    #[error("persistence write failed: {message}")]
    PersistenceWrite { message: String },

    /// Downstream event delivery failed. Never escalates past the engine;
    /// the events remain durably recorded.
    #[error("event notification failed: {message}")]
    Notification { message: String },
}

impl SyncError {
    /// Create a source fetch error.
    pub fn source_fetch(message: impl Into<String>) -> Self {
        SyncError::SourceFetch {
            message: message.into(),
        }
    }

    /// Create an archive load error.
    pub fn archive_load(message: impl Into<String>) -> Self {
        SyncError::ArchiveLoad {
            message: message.into(),
        }
    }

    /// Create a persistence write error.
    pub fn persistence_write(message: impl Into<String>) -> Self {
        SyncError::PersistenceWrite {
            message: message.into(),
        }
    }

    /// Create a notification error.
    pub fn notification(message: impl Into<String>) -> Self {
        SyncError::Notification {
            message: message.into(),
        }
    }

    /// Whether the error is guaranteed to have occurred before any mutation.
    ///
    /// Fetch, load and validation failures abort the cycle with the store
    /// untouched. Write failures may leave earlier batches committed.
    pub fn aborts_before_mutation(&self) -> bool {
        matches!(
            self,
            SyncError::SourceFetch { .. }
                | SyncError::ArchiveLoad { .. }
                | SyncError::DataQuality { .. }
        )
    }

    /// Get an error code for classification in logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::SourceFetch { .. } => "SOURCE_FETCH",
            SyncError::ArchiveLoad { .. } => "ARCHIVE_LOAD",
            SyncError::DataQuality { .. } => "DATA_QUALITY",
            SyncError::PersistenceWrite { .. } => "PERSISTENCE_WRITE",
            SyncError::Notification { .. } => "NOTIFICATION",
        }
    }
}

/// Result type for reconciliation operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_mutation_classification() {
        assert!(SyncError::source_fetch("boom").aborts_before_mutation());
        assert!(SyncError::archive_load("boom").aborts_before_mutation());
        assert!(SyncError::DataQuality {
            observed: 3,
            required: 10
        }
        .aborts_before_mutation());

        assert!(!SyncError::persistence_write("boom").aborts_before_mutation());
        assert!(!SyncError::notification("boom").aborts_before_mutation());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::DataQuality {
            observed: 3,
            required: 10,
        };
        assert_eq!(
            err.to_string(),
            "fresh roster has 3 members, below the minimum of 10"
        );

        let err = SyncError::source_fetch("connection refused");
        assert_eq!(err.to_string(), "roster fetch failed: connection refused");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SyncError::source_fetch("x").error_code(), "SOURCE_FETCH");
        assert_eq!(SyncError::notification("x").error_code(), "NOTIFICATION");
    }
}
