//! Core types for docbatch
//!
//! This crate defines the foundational types used throughout the system:
//! - DocumentId, PartitionKey, Revision: typed identifiers
//! - Document: caller-side document value with a typed revision tag
//! - Limits: chunk weight and id bounds
//! - BatchError: error taxonomy (Conflict, Service, InvalidInput, Config)
//! - Traits: the document-store collaborator (DocumentStore, AtomicUnit)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod limits;
pub mod traits;
pub mod types;

pub use document::{Document, ID_FIELD, REVISION_FIELD};
pub use error::{BatchError, BatchResult};
pub use limits::{LimitError, Limits, MAX_CHUNK_WEIGHT, MAX_DOCUMENT_ID_BYTES};
pub use traits::{AtomicUnit, CommitOutcome, DocumentStore, StoreStatus};
pub use types::{DocumentId, PartitionKey, Revision};
