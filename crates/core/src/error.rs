//! Error types for batched document writes
//!
//! This module defines the error taxonomy surfaced to callers.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! | Variant        | Meaning                                           | Caller action              |
//! |----------------|---------------------------------------------------|----------------------------|
//! | `Conflict`     | A revision precondition failed during a commit    | Reload and retry           |
//! | `Service`      | The store rejected a commit for any other reason  | Retry the whole write      |
//! | `InvalidInput` | Malformed request handed to the accumulator       | Fix the request            |
//! | `InvalidState` | Operation not allowed in the current lifecycle    | Build a new batch          |
//! | `Config`       | Configuration could not be read or is invalid     | Fix the configuration      |

use thiserror::Error;

use crate::limits::LimitError;
use crate::types::DocumentId;

/// Result type alias for batch operations
pub type BatchResult<T> = std::result::Result<T, BatchError>;

/// Error types for batched document writes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// A revision precondition failed; the resource changed since it was read
    #[error("Conflict: {message}")]
    Conflict {
        /// Document whose precondition failed, when the store reports it
        document_id: Option<DocumentId>,
        /// Human-readable message; always asks the caller to reload and retry
        message: String,
    },

    /// The store reported a non-success outcome other than a precondition failure
    #[error("Service error: {detail}")]
    Service {
        /// Status detail reported by the store
        detail: String,
    },

    /// Malformed input to the accumulator
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the request
        message: String,
    },

    /// Operation not permitted in the current execution state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Which transition was attempted
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },
}

impl BatchError {
    /// Build a conflict error with the standard reload-and-retry message
    pub fn conflict(document_id: Option<DocumentId>) -> Self {
        let message = match &document_id {
            Some(id) => format!(
                "document '{}' was modified by another writer since it was read; reload it and retry",
                id
            ),
            None => "a document was modified by another writer since it was read; reload it and retry"
                .to_string(),
        };
        BatchError::Conflict {
            document_id,
            message,
        }
    }

    /// Build a service error carrying the store's status detail
    pub fn service(detail: impl Into<String>) -> Self {
        BatchError::Service {
            detail: detail.into(),
        }
    }

    /// Build an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        BatchError::InvalidInput {
            message: message.into(),
        }
    }

    /// Build an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        BatchError::InvalidState {
            message: message.into(),
        }
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        BatchError::Config {
            message: message.into(),
        }
    }

    /// Whether this is a concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, BatchError::Conflict { .. })
    }

    /// Whether this is a store failure other than a conflict
    pub fn is_service(&self) -> bool {
        matches!(self, BatchError::Service { .. })
    }

    /// Whether this is a malformed-input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, BatchError::InvalidInput { .. })
    }

    /// Whether this is a lifecycle misuse
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, BatchError::InvalidState { .. })
    }
}

impl From<LimitError> for BatchError {
    fn from(e: LimitError) -> Self {
        BatchError::invalid_input(e.to_string())
    }
}
