//! Weighted write operations
//!
//! An [`Operation`] is one mutation of one document, staged into a chunk and
//! later onto a store unit. A [`WriteRequest`] is what a caller asks for;
//! it decomposes into one or two operations that are always placed together.
//!
//! | Request  | Operations                                 | Weight |
//! |----------|--------------------------------------------|--------|
//! | Create   | `Create(doc)`                              | 1      |
//! | Update   | `ReplaceWithConcurrency(old)`, `Create(new)` | 2    |
//! | Upsert   | `Upsert(doc)`                              | 1      |

use docbatch_core::{AtomicUnit, BatchError, BatchResult, Document, DocumentId, Revision};

/// Kind of mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Insert a document that must not exist yet
    Create,
    /// Replace a document only if its stored revision is unchanged
    ReplaceWithConcurrency,
    /// Insert or overwrite unconditionally
    Upsert,
}

/// Precondition-carrying mutation, private so kind and revision always agree
#[derive(Debug, Clone, PartialEq)]
enum Mutation {
    Create,
    Replace { expected: Revision },
    Upsert,
}

/// One mutation against one document
///
/// Immutable once built. [`Operation::expected_revision`] is `Some` exactly
/// when the kind is [`OperationKind::ReplaceWithConcurrency`].
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    mutation: Mutation,
    document_id: DocumentId,
    payload: Document,
}

impl Operation {
    /// Weight every single operation contributes to its chunk
    pub const WEIGHT: usize = 1;

    /// Build a create
    pub fn create(document: Document) -> Self {
        Self {
            mutation: Mutation::Create,
            document_id: document.id.clone(),
            payload: document,
        }
    }

    /// Build a replace guarded by `expected` on the stored revision
    pub fn replace_with_concurrency(document: Document, expected: Revision) -> Self {
        Self {
            mutation: Mutation::Replace { expected },
            document_id: document.id.clone(),
            payload: document,
        }
    }

    /// Build an upsert
    pub fn upsert(document: Document) -> Self {
        Self {
            mutation: Mutation::Upsert,
            document_id: document.id.clone(),
            payload: document,
        }
    }

    /// Mutation kind
    pub fn kind(&self) -> OperationKind {
        match self.mutation {
            Mutation::Create => OperationKind::Create,
            Mutation::Replace { .. } => OperationKind::ReplaceWithConcurrency,
            Mutation::Upsert => OperationKind::Upsert,
        }
    }

    /// Target document
    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    /// Document body to write
    pub fn payload(&self) -> &Document {
        &self.payload
    }

    /// Revision the stored document must still carry (replace only)
    pub fn expected_revision(&self) -> Option<&Revision> {
        match &self.mutation {
            Mutation::Replace { expected } => Some(expected),
            _ => None,
        }
    }

    /// Weight contributed to a chunk
    pub fn weight(&self) -> usize {
        Self::WEIGHT
    }

    /// Stage this operation onto a store unit
    pub fn stage_into<U: AtomicUnit + ?Sized>(self, unit: &mut U) {
        match self.mutation {
            Mutation::Create => unit.add_create(self.payload),
            Mutation::Replace { expected } => {
                unit.add_replace(self.document_id, self.payload, expected)
            }
            Mutation::Upsert => unit.add_upsert(self.payload),
        }
    }
}

/// A caller-level write intent
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    /// Create a new document
    Create(Document),
    /// Replace `old` under its read revision, then create `new`
    ///
    /// Used for moves and renames where the document identity changes.
    Update {
        /// Previously read document; must carry its revision
        old: Document,
        /// Document to create
        new: Document,
    },
    /// Create or overwrite a document
    Upsert(Document),
}

impl WriteRequest {
    /// Combined weight of the request's operations
    pub fn weight(&self) -> usize {
        match self {
            WriteRequest::Create(_) | WriteRequest::Upsert(_) => Operation::WEIGHT,
            WriteRequest::Update { .. } => 2 * Operation::WEIGHT,
        }
    }

    /// Decompose into operations, in the order they are staged
    ///
    /// Fails with `InvalidInput` if an update's old document carries no
    /// revision, since the replace would have nothing to compare against.
    pub fn into_operations(self) -> BatchResult<Vec<Operation>> {
        match self {
            WriteRequest::Create(doc) => Ok(vec![Operation::create(doc)]),
            WriteRequest::Upsert(doc) => Ok(vec![Operation::upsert(doc)]),
            WriteRequest::Update { mut old, new } => {
                let expected = old.revision.take().ok_or_else(|| {
                    BatchError::invalid_input(format!(
                        "document '{}' has no revision tag; read it from the store before updating",
                        old.id
                    ))
                })?;
                Ok(vec![
                    Operation::replace_with_concurrency(old, expected),
                    Operation::create(new),
                ])
            }
        }
    }
}
