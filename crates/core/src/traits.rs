//! Core traits for the document-store collaborator
//!
//! This module defines the DocumentStore and AtomicUnit traits that the
//! batching layer commits through. Any partitioned store offering bounded
//! all-or-nothing units with revision preconditions can sit behind them.
//!
//! Thread safety: a store is shared by many request handlers (requires
//! Send + Sync); a unit is owned by exactly one batch while it is built
//! and committed.

use async_trait::async_trait;
use std::fmt;

use crate::document::Document;
use crate::types::{DocumentId, PartitionKey, Revision};

/// Status reported by the store for a failed atomic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreStatus {
    /// Malformed unit (e.g. too many operations)
    BadRequest,
    /// A replaced document does not exist
    NotFound,
    /// A created document already exists
    Conflict,
    /// Unit payload exceeds the store's size cap
    RequestEntityTooLarge,
    /// Throttled
    TooManyRequests,
    /// Store unreachable or unavailable
    ServiceUnavailable,
    /// Any other status code
    Other(u16),
}

impl StoreStatus {
    /// Numeric status code
    pub fn code(&self) -> u16 {
        match self {
            StoreStatus::BadRequest => 400,
            StoreStatus::NotFound => 404,
            StoreStatus::Conflict => 409,
            StoreStatus::RequestEntityTooLarge => 413,
            StoreStatus::TooManyRequests => 429,
            StoreStatus::ServiceUnavailable => 503,
            StoreStatus::Other(code) => *code,
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreStatus::Other(code) => write!(f, "Status({})", code),
            other => write!(f, "{:?} ({})", other, other.code()),
        }
    }
}

/// Outcome of committing one atomic unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every operation in the unit was applied
    Committed,
    /// A revision precondition did not hold; nothing was applied
    PreconditionFailed {
        /// Document whose stored revision differed, if known
        document_id: Option<DocumentId>,
        /// Store-supplied detail
        detail: String,
    },
    /// The unit failed for another reason; nothing was applied
    Failed {
        /// Store status
        status: StoreStatus,
        /// Store-supplied detail
        detail: String,
    },
}

impl CommitOutcome {
    /// Whether the unit was applied
    pub fn is_success(&self) -> bool {
        matches!(self, CommitOutcome::Committed)
    }

    /// Whether the unit was rejected by a revision precondition
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, CommitOutcome::PreconditionFailed { .. })
    }

    /// Status detail, formatted for surfacing to callers
    pub fn status_detail(&self) -> String {
        match self {
            CommitOutcome::Committed => "OK".to_string(),
            CommitOutcome::PreconditionFailed { detail, .. } => {
                format!("PreconditionFailed (412): {}", detail)
            }
            CommitOutcome::Failed { status, detail } => format!("{}: {}", status, detail),
        }
    }
}

/// One atomic unit being built against a single partition
///
/// Operations are staged in call order and applied all-or-nothing by
/// [`AtomicUnit::commit`].
#[async_trait]
pub trait AtomicUnit: Send {
    /// Stage a create; fails at commit if the id already exists
    fn add_create(&mut self, document: Document);

    /// Stage a replace that only applies while the stored revision equals `precondition`
    fn add_replace(&mut self, id: DocumentId, document: Document, precondition: Revision);

    /// Stage an unconditional create-or-replace
    fn add_upsert(&mut self, document: Document);

    /// Number of staged operations
    fn len(&self) -> usize;

    /// Whether nothing is staged
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Submit the staged operations as one all-or-nothing unit
    ///
    /// The only suspension point of a batch. Staged operations are drained.
    async fn commit(&mut self) -> CommitOutcome;
}

/// A partitioned document store supporting atomic units
pub trait DocumentStore: Send + Sync {
    /// Unit type handed out by this store
    type Unit: AtomicUnit;

    /// Start a new atomic unit scoped to `partition_key`
    fn begin_atomic_unit(&self, partition_key: &PartitionKey) -> Self::Unit;
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    type Unit = S::Unit;

    fn begin_atomic_unit(&self, partition_key: &PartitionKey) -> Self::Unit {
        (**self).begin_atomic_unit(partition_key)
    }
}
