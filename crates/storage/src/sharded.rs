//! Sharded in-memory document store
//!
//! Partitions live in a DashMap keyed by partition key; each partition is an
//! FxHashMap from document id to the stored body and its revision tag.
//!
//! # Design
//!
//! - DashMap: 16-way sharded by default, lock-free reads
//! - FxHashMap: O(1) lookups within a partition
//! - Per-partition: an atomic unit holds the partition's entry guard for the
//!   whole validate-then-apply step, so a unit is all-or-nothing and two
//!   units on the same partition serialize
//!
//! # Revisions
//!
//! Every successful write assigns a fresh opaque revision (a UUID v4 string).
//! Revisions are compared for equality only.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use docbatch_core::{
    AtomicUnit, CommitOutcome, Document, DocumentId, DocumentStore, PartitionKey, Revision,
    StoreStatus, MAX_CHUNK_WEIGHT,
};

/// A document as held by the store
#[derive(Debug, Clone, PartialEq)]
struct StoredDocument {
    revision: Revision,
    body: JsonValue,
}

/// Documents of one partition
type Partition = FxHashMap<DocumentId, StoredDocument>;

/// Operation staged in an [`InMemoryUnit`]
#[derive(Debug, Clone)]
enum StagedOp {
    Create(Document),
    Replace {
        id: DocumentId,
        document: Document,
        precondition: Revision,
    },
    Upsert(Document),
}

struct StoreInner {
    /// Per-partition documents
    partitions: DashMap<PartitionKey, Partition>,
    /// Store-imposed cap on operations per unit
    max_operations_per_unit: usize,
    /// Number of unit commits attempted
    commits: AtomicU64,
    /// One-shot failure returned by the next commit
    injected_failure: Mutex<Option<(StoreStatus, String)>>,
}

/// In-memory partitioned document store with atomic units
///
/// Cloning is cheap; clones share the same data.
///
/// # Example
///
/// ```ignore
/// use docbatch_storage::InMemoryDocumentStore;
///
/// let store = InMemoryDocumentStore::new();
/// let unit = store.begin_atomic_unit(&"locations".into());
/// ```
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    inner: Arc<StoreInner>,
}

impl InMemoryDocumentStore {
    /// Create an empty store capping units at the default chunk weight
    pub fn new() -> Self {
        Self::with_max_operations_per_unit(MAX_CHUNK_WEIGHT)
    }

    /// Create an empty store with a custom cap on operations per unit
    pub fn with_max_operations_per_unit(max_operations_per_unit: usize) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                partitions: DashMap::new(),
                max_operations_per_unit,
                commits: AtomicU64::new(0),
                injected_failure: Mutex::new(None),
            }),
        }
    }

    /// Store-imposed cap on operations per unit
    pub fn max_operations_per_unit(&self) -> usize {
        self.inner.max_operations_per_unit
    }

    /// Read a document, stamped with its current revision
    pub fn get(&self, partition_key: &PartitionKey, id: &DocumentId) -> Option<Document> {
        let partition = self.inner.partitions.get(partition_key)?;
        let doc = partition
            .get(id)
            .map(|d| Document::with_revision(id.clone(), d.revision.clone(), d.body.clone()));
        doc
    }

    /// Read a document as raw JSON, with the reserved `id` and `_etag` fields stamped in
    pub fn get_json(&self, partition_key: &PartitionKey, id: &DocumentId) -> Option<JsonValue> {
        self.get(partition_key, id).map(|doc| doc.to_stored_json())
    }

    /// Unconditionally write a document outside of any unit
    ///
    /// Returns the revision assigned to the write.
    pub fn put(&self, partition_key: &PartitionKey, document: Document) -> Revision {
        let revision = next_revision();
        let mut partition = self.inner.partitions.entry(partition_key.clone()).or_default();
        partition.insert(
            document.id,
            StoredDocument {
                revision: revision.clone(),
                body: document.body,
            },
        );
        revision
    }

    /// Number of documents in a partition
    pub fn len(&self, partition_key: &PartitionKey) -> usize {
        self.inner
            .partitions
            .get(partition_key)
            .map(|p| p.len())
            .unwrap_or(0)
    }

    /// Check if a partition holds no documents
    pub fn is_empty(&self, partition_key: &PartitionKey) -> bool {
        self.len(partition_key) == 0
    }

    /// Number of unit commits attempted so far
    pub fn commit_count(&self) -> u64 {
        self.inner.commits.load(Ordering::Acquire)
    }

    /// Make the next unit commit fail with `status` without applying anything
    pub fn fail_next_commit(&self, status: StoreStatus, detail: impl Into<String>) {
        *self.inner.injected_failure.lock() = Some((status, detail.into()));
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    type Unit = InMemoryUnit;

    fn begin_atomic_unit(&self, partition_key: &PartitionKey) -> InMemoryUnit {
        InMemoryUnit {
            inner: Arc::clone(&self.inner),
            partition_key: partition_key.clone(),
            staged: Vec::new(),
        }
    }
}

/// Atomic unit against one partition of an [`InMemoryDocumentStore`]
pub struct InMemoryUnit {
    inner: Arc<StoreInner>,
    partition_key: PartitionKey,
    staged: Vec<StagedOp>,
}

#[async_trait]
impl AtomicUnit for InMemoryUnit {
    fn add_create(&mut self, document: Document) {
        self.staged.push(StagedOp::Create(document));
    }

    fn add_replace(&mut self, id: DocumentId, document: Document, precondition: Revision) {
        self.staged.push(StagedOp::Replace {
            id,
            document,
            precondition,
        });
    }

    fn add_upsert(&mut self, document: Document) {
        self.staged.push(StagedOp::Upsert(document));
    }

    fn len(&self) -> usize {
        self.staged.len()
    }

    async fn commit(&mut self) -> CommitOutcome {
        let staged = std::mem::take(&mut self.staged);
        self.inner.apply_unit(&self.partition_key, staged)
    }
}

impl StoreInner {
    /// Validate every staged operation, then apply all of them or none
    fn apply_unit(&self, partition_key: &PartitionKey, staged: Vec<StagedOp>) -> CommitOutcome {
        self.commits.fetch_add(1, Ordering::AcqRel);

        if let Some((status, detail)) = self.injected_failure.lock().take() {
            debug!(target: "docbatch::store", partition = %partition_key, %status, "Injected unit failure");
            return CommitOutcome::Failed { status, detail };
        }

        if staged.len() > self.max_operations_per_unit {
            return CommitOutcome::Failed {
                status: StoreStatus::BadRequest,
                detail: format!(
                    "unit has {} operations; at most {} are allowed",
                    staged.len(),
                    self.max_operations_per_unit
                ),
            };
        }

        // The entry guard locks this partition's shard until the unit is applied.
        let mut partition = self.partitions.entry(partition_key.clone()).or_default();

        // Writes of earlier operations in the unit are visible to later ones.
        let mut pending: FxHashMap<DocumentId, StoredDocument> = FxHashMap::default();
        let op_count = staged.len();

        for op in staged {
            match op {
                StagedOp::Create(document) => {
                    if pending.contains_key(&document.id) || partition.contains_key(&document.id) {
                        return CommitOutcome::Failed {
                            status: StoreStatus::Conflict,
                            detail: format!("document '{}' already exists", document.id),
                        };
                    }
                    pending.insert(document.id, stored(document.body));
                }
                StagedOp::Replace {
                    id,
                    document,
                    precondition,
                } => {
                    let current = pending
                        .get(&id)
                        .or_else(|| partition.get(&id))
                        .map(|d| d.revision.clone());
                    match current {
                        None => {
                            return CommitOutcome::Failed {
                                status: StoreStatus::NotFound,
                                detail: format!("document '{}' does not exist", id),
                            };
                        }
                        Some(rev) if rev != precondition => {
                            debug!(target: "docbatch::store", partition = %partition_key, document = %id, "Revision precondition failed");
                            return CommitOutcome::PreconditionFailed {
                                detail: format!(
                                    "document '{}' has revision {}, expected {}",
                                    id, rev, precondition
                                ),
                                document_id: Some(id),
                            };
                        }
                        Some(_) => {
                            pending.insert(id, stored(document.body));
                        }
                    }
                }
                StagedOp::Upsert(document) => {
                    pending.insert(document.id, stored(document.body));
                }
            }
        }

        partition.extend(pending);
        debug!(target: "docbatch::store", partition = %partition_key, operations = op_count, "Unit applied");
        CommitOutcome::Committed
    }
}

fn stored(body: JsonValue) -> StoredDocument {
    StoredDocument {
        revision: next_revision(),
        body,
    }
}

fn next_revision() -> Revision {
    Revision::new(Uuid::new_v4().to_string())
}
