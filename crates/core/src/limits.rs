//! Size limits for batches and document ids
//!
//! This module defines the bounds enforced while accumulating a batch.
//! Violations result in `InvalidInput` errors.
//!
//! ## Contract
//!
//! The default chunk weight matches the store's hard cap on operations per
//! atomic unit. Other stores may impose a different cap, so the bound is
//! carried as data rather than hard-coded at the call sites.

use thiserror::Error;

use crate::types::DocumentId;

/// Maximum weight of one chunk (operations per atomic unit) for the default store
pub const MAX_CHUNK_WEIGHT: usize = 100;

/// Maximum document id length in bytes
pub const MAX_DOCUMENT_ID_BYTES: usize = 255;

/// Limits enforced during accumulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum summed operation weight per chunk (default: 100)
    pub max_chunk_weight: usize,

    /// Maximum document id length in bytes (default: 255)
    pub max_id_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_chunk_weight: MAX_CHUNK_WEIGHT,
            max_id_bytes: MAX_DOCUMENT_ID_BYTES,
        }
    }
}

impl Limits {
    /// Create limits with a custom chunk weight and default id limits
    pub fn with_max_chunk_weight(max_chunk_weight: usize) -> Self {
        Limits {
            max_chunk_weight,
            ..Limits::default()
        }
    }

    /// Create limits with small values for testing
    ///
    /// Lets unit tests cross chunk boundaries without building hundreds of
    /// requests.
    pub fn with_small_limits() -> Self {
        Limits {
            max_chunk_weight: 4,
            max_id_bytes: 16,
        }
    }

    /// Validate a document id
    ///
    /// Returns `Err(LimitError::EmptyDocumentId)` for an empty id and
    /// `Err(LimitError::DocumentIdTooLong)` past `max_id_bytes`.
    pub fn validate_document_id(&self, id: &DocumentId) -> Result<(), LimitError> {
        if id.is_empty() {
            return Err(LimitError::EmptyDocumentId);
        }
        let len = id.as_str().len();
        if len > self.max_id_bytes {
            return Err(LimitError::DocumentIdTooLong {
                actual: len,
                max: self.max_id_bytes,
            });
        }
        Ok(())
    }

    /// Validate the weight of one logical request
    ///
    /// A request heavier than a whole chunk could never be placed.
    pub fn validate_request_weight(&self, weight: usize) -> Result<(), LimitError> {
        if weight > self.max_chunk_weight {
            return Err(LimitError::RequestTooHeavy {
                weight,
                max: self.max_chunk_weight,
            });
        }
        Ok(())
    }
}

/// Limit validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Document id is empty
    #[error("Document id must not be empty")]
    EmptyDocumentId,

    /// Document id exceeds maximum length
    #[error("Document id too long: {actual} bytes exceeds maximum {max}")]
    DocumentIdTooLong {
        /// Actual id length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// A single request outweighs a whole chunk
    #[error("Request weight {weight} exceeds maximum chunk weight {max}")]
    RequestTooHeavy {
        /// Weight of the rejected request
        weight: usize,
        /// Maximum chunk weight
        max: usize,
    },
}

impl LimitError {
    /// Get a stable reason code
    pub fn reason_code(&self) -> &'static str {
        match self {
            LimitError::EmptyDocumentId => "empty_document_id",
            LimitError::DocumentIdTooLong { .. } => "document_id_too_long",
            LimitError::RequestTooHeavy { .. } => "request_too_heavy",
        }
    }
}
