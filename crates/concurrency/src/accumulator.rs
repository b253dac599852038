//! Packing write requests into chunks
//!
//! The accumulator only ever tries the last chunk: if the next request fits
//! there it is appended, otherwise a new chunk is opened. Packing density is
//! traded for submission order, which later chunks may depend on (a create
//! in chunk 2 can reference a document replaced in chunk 1).
//!
//! ## Invariants
//!
//! - Every operation belongs to exactly one chunk
//! - `chunk.total_weight() <= max_chunk_weight` for every chunk
//! - The two operations of an update never straddle a chunk boundary
//! - Operations appear in chunks in submission order
//!
//! Accumulation is synchronous and single-owner; it never suspends.

use docbatch_core::{BatchError, BatchResult, Document, Limits, PartitionKey};
use tracing::debug;

use crate::chunk::Chunk;
use crate::operation::WriteRequest;

/// Accumulates write requests for one partition into bounded chunks
#[derive(Debug, Clone)]
pub struct BatchAccumulator {
    partition_key: PartitionKey,
    limits: Limits,
    chunks: Vec<Chunk>,
}

impl BatchAccumulator {
    /// Create an accumulator with default limits
    pub fn new(partition_key: PartitionKey) -> Self {
        Self::with_limits(partition_key, Limits::default())
    }

    /// Create an accumulator with custom limits
    pub fn with_limits(partition_key: PartitionKey, limits: Limits) -> Self {
        Self {
            partition_key,
            limits,
            chunks: Vec::new(),
        }
    }

    /// Append a `Create` of weight 1
    pub fn create_item(&mut self, document: Document) -> BatchResult<()> {
        self.push(WriteRequest::Create(document))
    }

    /// Append `ReplaceWithConcurrency(old)` then `Create(new)`, weight 2, in one chunk
    ///
    /// `old` must carry the revision tag it was read with, and `new` must
    /// have a different id: the pair models a move where identity changes.
    pub fn update_item(&mut self, old: Document, new: Document) -> BatchResult<()> {
        self.push(WriteRequest::Update { old, new })
    }

    /// Append an `Upsert` of weight 1
    pub fn upsert_item(&mut self, document: Document) -> BatchResult<()> {
        self.push(WriteRequest::Upsert(document))
    }

    /// Validate a request and place its operations into the last chunk that fits
    pub fn push(&mut self, request: WriteRequest) -> BatchResult<()> {
        self.validate(&request)?;

        let weight = request.weight();
        let operations = request.into_operations()?;
        let max = self.limits.max_chunk_weight;

        let needs_new_chunk = match self.chunks.last() {
            Some(current) => !current.fits(weight, max),
            None => true,
        };
        if needs_new_chunk {
            self.chunks.push(Chunk::new());
            debug!(
                target: "docbatch::batch",
                partition = %self.partition_key,
                chunk = self.chunks.len() - 1,
                "Opened chunk"
            );
        }

        if let Some(current) = self.chunks.last_mut() {
            current.push_group(operations);
        }
        Ok(())
    }

    fn validate(&self, request: &WriteRequest) -> BatchResult<()> {
        self.limits.validate_request_weight(request.weight())?;
        match request {
            WriteRequest::Create(doc) | WriteRequest::Upsert(doc) => {
                self.limits.validate_document_id(&doc.id)?;
            }
            WriteRequest::Update { old, new } => {
                self.limits.validate_document_id(&old.id)?;
                self.limits.validate_document_id(&new.id)?;
                if old.id == new.id {
                    return Err(BatchError::invalid_input(format!(
                        "update of '{}' must create a document with a different id",
                        old.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Partition every chunk commits against
    pub fn partition_key(&self) -> &PartitionKey {
        &self.partition_key
    }

    /// Bound on each chunk's weight
    pub fn max_chunk_weight(&self) -> usize {
        self.limits.max_chunk_weight
    }

    /// Chunks formed so far, in commit order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of operations across all chunks
    pub fn operation_count(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Take the chunks, ending accumulation
    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}
