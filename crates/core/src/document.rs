//! Caller-side document value
//!
//! A [`Document`] pairs an opaque JSON body with the two reserved fields the
//! batching layer needs: the document id and, for documents previously read
//! from the store, the revision tag captured at read time. Both are typed
//! fields rather than lookups into the body.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::{DocumentId, Revision};

/// Body field the store uses for the document id
pub const ID_FIELD: &str = "id";

/// Body field the store uses for the revision tag
pub const REVISION_FIELD: &str = "_etag";

/// A document as handed to (or read back from) the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique key within the partition
    pub id: DocumentId,
    /// Revision tag observed when the document was read, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
    /// Opaque document body
    pub body: JsonValue,
}

impl Document {
    /// Create a new, never-stored document
    pub fn new(id: impl Into<DocumentId>, body: JsonValue) -> Self {
        Self {
            id: id.into(),
            revision: None,
            body,
        }
    }

    /// Create a document as read from the store, carrying its revision tag
    pub fn with_revision(id: impl Into<DocumentId>, revision: Revision, body: JsonValue) -> Self {
        Self {
            id: id.into(),
            revision: Some(revision),
            body,
        }
    }

    /// Revision tag captured at read time
    pub fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    /// Render the document the way the store exposes it on read
    ///
    /// Object bodies get the reserved `id` and `_etag` fields stamped in;
    /// non-object bodies are returned as-is.
    pub fn to_stored_json(&self) -> JsonValue {
        let mut body = self.body.clone();
        if let JsonValue::Object(map) = &mut body {
            map.insert(ID_FIELD.to_string(), JsonValue::String(self.id.to_string()));
            if let Some(rev) = &self.revision {
                map.insert(
                    REVISION_FIELD.to_string(),
                    JsonValue::String(rev.to_string()),
                );
            }
        }
        body
    }
}
