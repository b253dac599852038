//! Shared test utilities for the batch integration suite.

#![allow(dead_code)]

use async_trait::async_trait;
use docbatch::{
    AtomicUnit, CommitOutcome, Document, DocumentId, DocumentStore, PartitionKey, Revision,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;

// ============================================================================
// Document helpers
// ============================================================================

/// A never-stored document
pub fn doc(id: &str) -> Document {
    Document::new(id, json!({ "name": id }))
}

/// A document as if read from the store at `rev`
pub fn read_doc(id: &str, rev: &str) -> Document {
    Document::with_revision(id, Revision::new(rev), json!({ "name": id }))
}

pub fn pk() -> PartitionKey {
    PartitionKey::new("locations")
}

// ============================================================================
// ScriptedStore - store double with scripted outcomes
// ============================================================================

/// A call staged onto a unit, as the store saw it
#[derive(Debug, Clone, PartialEq)]
pub enum StagedCall {
    Create(DocumentId),
    Replace { id: DocumentId, precondition: Revision },
    Upsert(DocumentId),
}

/// Records every committed unit and answers with scripted outcomes
///
/// Commits beyond the script answer `Committed`.
#[derive(Clone, Default)]
pub struct ScriptedStore {
    units: Arc<Mutex<Vec<(PartitionKey, Vec<StagedCall>)>>>,
    script: Arc<Mutex<VecDeque<CommitOutcome>>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: Vec<CommitOutcome>) -> Self {
        let store = Self::new();
        store.script.lock().extend(outcomes);
        store
    }

    /// Units submitted so far, in submission order
    pub fn units(&self) -> Vec<(PartitionKey, Vec<StagedCall>)> {
        self.units.lock().clone()
    }

    pub fn commit_count(&self) -> usize {
        self.units.lock().len()
    }
}

impl DocumentStore for ScriptedStore {
    type Unit = ScriptedUnit;

    fn begin_atomic_unit(&self, partition_key: &PartitionKey) -> ScriptedUnit {
        ScriptedUnit {
            store: self.clone(),
            partition_key: partition_key.clone(),
            staged: Vec::new(),
        }
    }
}

pub struct ScriptedUnit {
    store: ScriptedStore,
    partition_key: PartitionKey,
    staged: Vec<StagedCall>,
}

#[async_trait]
impl AtomicUnit for ScriptedUnit {
    fn add_create(&mut self, document: Document) {
        self.staged.push(StagedCall::Create(document.id));
    }

    fn add_replace(&mut self, id: DocumentId, _document: Document, precondition: Revision) {
        self.staged.push(StagedCall::Replace { id, precondition });
    }

    fn add_upsert(&mut self, document: Document) {
        self.staged.push(StagedCall::Upsert(document.id));
    }

    fn len(&self) -> usize {
        self.staged.len()
    }

    async fn commit(&mut self) -> CommitOutcome {
        let staged = std::mem::take(&mut self.staged);
        self.store
            .units
            .lock()
            .push((self.partition_key.clone(), staged));
        self.store
            .script
            .lock()
            .pop_front()
            .unwrap_or(CommitOutcome::Committed)
    }
}
