//! Sequential chunk commits against the store
//!
//! The coordinator submits each chunk as one atomic unit, awaiting each
//! commit before starting the next, and stops at the first failure.
//!
//! ## Commit Sequence
//!
//! ```text
//! Idle
//!  └─ for each chunk i, in accumulation order:
//!       Committing { chunk: i }
//!         1. begin_atomic_unit(partition_key)
//!         2. stage every operation of chunk i
//!         3. commit().await
//!         4. PreconditionFailed -> Failed, return Conflict
//!            Failed             -> Failed, return Service
//!            Committed          -> next chunk
//!  └─ Succeeded
//! ```
//!
//! Atomicity holds within a chunk only. Chunks committed before a failing
//! one stay applied; no compensation is attempted and no retry is made.

use docbatch_core::{AtomicUnit, BatchError, BatchResult, CommitOutcome, DocumentStore, PartitionKey};
use tracing::{debug, info, warn};

use crate::chunk::Chunk;

/// Lifecycle of one execution
///
/// State transitions:
/// - `Idle` → `Committing { chunk: 0 }` (first chunk submitted)
/// - `Idle` → `Succeeded` (nothing to commit)
/// - `Committing { chunk: i }` → `Committing { chunk: i + 1 }`
/// - `Committing { .. }` → `Succeeded` | `Failed`
///
/// Terminal states: `Succeeded`, `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Nothing submitted yet
    Idle,
    /// Awaiting the commit of a chunk
    Committing {
        /// Zero-based index of the chunk in flight
        chunk: usize,
    },
    /// Every chunk committed
    Succeeded,
    /// A chunk failed; earlier chunks remain applied
    Failed,
}

impl ExecutionState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionState::Succeeded | ExecutionState::Failed)
    }
}

/// Commits chunks for one partition, in order, fail-fast
pub struct ExecutionCoordinator<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    partition_key: PartitionKey,
    state: ExecutionState,
    committed_chunks: usize,
}

impl<'s, S: DocumentStore + ?Sized> ExecutionCoordinator<'s, S> {
    /// Create a coordinator committing into `partition_key` of `store`
    pub fn new(store: &'s S, partition_key: PartitionKey) -> Self {
        Self {
            store,
            partition_key,
            state: ExecutionState::Idle,
            committed_chunks: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Number of chunks durably committed by this execution
    ///
    /// After a failure this counts the chunks that stay applied.
    pub fn committed_chunks(&self) -> usize {
        self.committed_chunks
    }

    /// Commit `chunks` in order
    ///
    /// # Errors
    ///
    /// - `Conflict` if a chunk's commit reports a failed revision precondition
    /// - `Service` if a chunk's commit reports any other failure
    /// - `InvalidState` if this coordinator has already executed
    ///
    /// No chunk after the failing one is submitted.
    pub async fn execute(&mut self, chunks: Vec<Chunk>) -> BatchResult<()> {
        if self.state != ExecutionState::Idle {
            return Err(BatchError::invalid_state(
                "execution coordinator has already run; build a new batch",
            ));
        }

        let total_chunks = chunks.len();
        let total_operations: usize = chunks.iter().map(Chunk::len).sum();

        for (index, chunk) in chunks.into_iter().enumerate() {
            self.state = ExecutionState::Committing { chunk: index };

            let operations = chunk.len();
            let mut unit = self.store.begin_atomic_unit(&self.partition_key);
            chunk.stage_into(&mut unit);

            match unit.commit().await {
                CommitOutcome::Committed => {
                    self.committed_chunks += 1;
                    debug!(
                        target: "docbatch::commit",
                        partition = %self.partition_key,
                        chunk = index,
                        operations,
                        "Chunk committed"
                    );
                }
                CommitOutcome::PreconditionFailed {
                    document_id,
                    detail,
                } => {
                    self.state = ExecutionState::Failed;
                    warn!(
                        target: "docbatch::commit",
                        partition = %self.partition_key,
                        chunk = index,
                        committed_chunks = self.committed_chunks,
                        %detail,
                        "Revision precondition failed; earlier chunks remain applied"
                    );
                    return Err(BatchError::conflict(document_id));
                }
                outcome @ CommitOutcome::Failed { .. } => {
                    self.state = ExecutionState::Failed;
                    let detail = outcome.status_detail();
                    warn!(
                        target: "docbatch::commit",
                        partition = %self.partition_key,
                        chunk = index,
                        committed_chunks = self.committed_chunks,
                        %detail,
                        "Chunk commit failed; earlier chunks remain applied"
                    );
                    return Err(BatchError::service(detail));
                }
            }
        }

        self.state = ExecutionState::Succeeded;
        if total_chunks > 0 {
            info!(
                target: "docbatch::commit",
                partition = %self.partition_key,
                chunks = total_chunks,
                operations = total_operations,
                "Batch committed"
            );
        }
        Ok(())
    }
}
