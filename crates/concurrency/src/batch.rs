//! Single-use transactional batch
//!
//! Binds an accumulator to a store and a partition. Requests are recorded
//! synchronously; [`TransactionalBatch::execute`] consumes the batch, so it
//! runs at most once.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = TransactionalBatch::new(&store, PartitionKey::new("locations"));
//! batch.update_item(old_campus, renamed_campus)?;
//! for room in rooms {
//!     batch.upsert_item(room)?;
//! }
//! batch.execute().await?;
//! ```

use docbatch_core::{BatchResult, Document, DocumentStore, PartitionKey};

use crate::accumulator::BatchAccumulator;
use crate::config::BatchConfig;
use crate::coordinator::ExecutionCoordinator;
use crate::operation::WriteRequest;

/// Multi-document write against one partition, committed in chunks
pub struct TransactionalBatch<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    accumulator: BatchAccumulator,
}

impl<'s, S: DocumentStore + ?Sized> TransactionalBatch<'s, S> {
    /// Create a batch with the default configuration
    pub fn new(store: &'s S, partition_key: PartitionKey) -> Self {
        Self {
            store,
            accumulator: BatchAccumulator::new(partition_key),
        }
    }

    /// Create a batch with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the configuration fails validation.
    pub fn with_config(
        store: &'s S,
        partition_key: PartitionKey,
        config: &BatchConfig,
    ) -> BatchResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            accumulator: BatchAccumulator::with_limits(partition_key, config.limits()),
        })
    }

    /// Record a create
    pub fn create_item(&mut self, document: Document) -> BatchResult<()> {
        self.accumulator.create_item(document)
    }

    /// Record a concurrency-checked replace of `old` followed by a create of `new`
    pub fn update_item(&mut self, old: Document, new: Document) -> BatchResult<()> {
        self.accumulator.update_item(old, new)
    }

    /// Record an upsert
    pub fn upsert_item(&mut self, document: Document) -> BatchResult<()> {
        self.accumulator.upsert_item(document)
    }

    /// Record any write request
    pub fn push(&mut self, request: WriteRequest) -> BatchResult<()> {
        self.accumulator.push(request)
    }

    /// Accumulated state, for inspection before executing
    pub fn accumulator(&self) -> &BatchAccumulator {
        &self.accumulator
    }

    /// Commit every chunk in order
    ///
    /// An empty batch succeeds without contacting the store. On failure,
    /// chunks committed before the failing one stay applied.
    ///
    /// # Errors
    ///
    /// `Conflict` on a failed revision precondition, `Service` on any other
    /// store failure.
    pub async fn execute(self) -> BatchResult<()> {
        let partition_key = self.accumulator.partition_key().clone();
        let mut coordinator = ExecutionCoordinator::new(self.store, partition_key);
        coordinator.execute(self.accumulator.into_chunks()).await
    }
}
