//! docbatch - chunked transactional writes with optimistic concurrency
//!
//! docbatch accepts an unbounded sequence of document mutations and commits
//! them against a partitioned store that only allows a bounded number of
//! operations per atomic unit, guarding replaces with revision (ETag)
//! preconditions so concurrent writers cannot lose each other's updates.
//!
//! # Quick Start
//!
//! ```ignore
//! use docbatch::{Document, InMemoryDocumentStore, PartitionKey, TransactionalBatch};
//!
//! let store = InMemoryDocumentStore::new();
//! let pk = PartitionKey::new("locations");
//! let campus = store.get(&pk, &"campus-1".into()).unwrap();
//!
//! let mut batch = TransactionalBatch::new(&store, pk);
//! batch.update_item(campus, Document::new("campus-1-v2", body))?;
//! batch.execute().await?;
//! ```
//!
//! # Architecture
//!
//! - `docbatch-core`: identifiers, documents, limits, errors, store traits
//! - `docbatch-concurrency`: accumulation into chunks and sequential commit
//! - `docbatch-storage`: in-memory partitioned store with atomic units
//!
//! Atomicity holds per chunk, not per batch: when a chunk fails, earlier
//! chunks stay applied.

pub use docbatch_concurrency::{
    BatchAccumulator, BatchConfig, Chunk, ExecutionCoordinator, ExecutionState, Operation,
    OperationKind, TransactionalBatch, WriteRequest, CONFIG_FILE_NAME,
};
pub use docbatch_core::{
    AtomicUnit, BatchError, BatchResult, CommitOutcome, Document, DocumentId, DocumentStore,
    LimitError, Limits, PartitionKey, Revision, StoreStatus, ID_FIELD, MAX_CHUNK_WEIGHT,
    MAX_DOCUMENT_ID_BYTES, REVISION_FIELD,
};
pub use docbatch_storage::{InMemoryDocumentStore, InMemoryUnit};
