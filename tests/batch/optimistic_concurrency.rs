//! Optimistic Concurrency Tests
//!
//! Tests for revision-guarded replaces:
//! - Replace succeeds while the stored revision matches
//! - Replace fails after any other write to the document
//! - Concurrent writers on the same document: exactly one wins
//! - Malformed update input is rejected before anything is staged

use crate::common::*;
use docbatch::{
    BatchAccumulator, Document, DocumentId, InMemoryDocumentStore, TransactionalBatch, ID_FIELD,
    REVISION_FIELD,
};
use serde_json::json;

// ============================================================================
// Single writer
// ============================================================================

#[tokio::test]
async fn fresh_read_then_update_succeeds() {
    let store = InMemoryDocumentStore::new();
    store.put(&pk(), Document::new("bldg-1", json!({"name": "Library"})));
    let current = store.get(&pk(), &DocumentId::new("bldg-1")).unwrap();

    let mut batch = TransactionalBatch::new(&store, pk());
    batch
        .update_item(current, Document::new("bldg-1-v2", json!({"name": "Main Library"})))
        .unwrap();
    batch.execute().await.unwrap();

    assert_eq!(
        store.get(&pk(), &DocumentId::new("bldg-1-v2")).unwrap().body,
        json!({"name": "Main Library"})
    );
}

#[tokio::test]
async fn stale_read_raises_conflict() {
    let store = InMemoryDocumentStore::new();
    store.put(&pk(), Document::new("bldg-1", json!({"name": "Library"})));
    let snapshot = store.get(&pk(), &DocumentId::new("bldg-1")).unwrap();

    // Someone else writes in between
    store.put(&pk(), Document::new("bldg-1", json!({"name": "Science Library"})));

    let mut batch = TransactionalBatch::new(&store, pk());
    batch
        .update_item(snapshot, Document::new("bldg-1-v2", json!({})))
        .unwrap();
    let err = batch.execute().await.unwrap_err();

    assert!(err.is_conflict());
    assert!(store.get(&pk(), &DocumentId::new("bldg-1-v2")).is_none());
}

#[tokio::test]
async fn revision_from_a_committed_batch_is_superseded() {
    let store = InMemoryDocumentStore::new();
    store.put(&pk(), Document::new("floor-3", json!({})));
    let first_read = store.get(&pk(), &DocumentId::new("floor-3")).unwrap();

    let mut batch = TransactionalBatch::new(&store, pk());
    batch
        .update_item(first_read.clone(), doc("floor-3-a"))
        .unwrap();
    batch.execute().await.unwrap();

    // The replace bumped the revision, so the same read cannot be reused
    let mut batch = TransactionalBatch::new(&store, pk());
    batch.update_item(first_read, doc("floor-3-b")).unwrap();
    assert!(batch.execute().await.unwrap_err().is_conflict());
}

#[tokio::test]
async fn raw_read_exposes_current_revision_tag() {
    let store = InMemoryDocumentStore::new();
    store.put(&pk(), Document::new("campus", json!({"name": "North"})));
    let before = store.get(&pk(), &DocumentId::new("campus")).unwrap();

    let mut batch = TransactionalBatch::new(&store, pk());
    batch.update_item(before.clone(), doc("campus-v2")).unwrap();
    batch.execute().await.unwrap();

    let typed = store.get(&pk(), &DocumentId::new("campus")).unwrap();
    let raw = store.get_json(&pk(), &DocumentId::new("campus")).unwrap();
    let etag = raw[REVISION_FIELD].as_str().unwrap();

    assert_eq!(Some(etag), typed.revision().map(|r| r.as_str()));
    assert_ne!(typed.revision, before.revision);
    assert_eq!(raw[ID_FIELD], json!("campus"));
    assert_eq!(raw["name"], json!("North"));
}

// ============================================================================
// Concurrent writers
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_exactly_one_wins() {
    let store = InMemoryDocumentStore::new();
    store.put(&pk(), Document::new("campus", json!({"name": "North"})));

    // Both writers read before either commits
    let read_a = store.get(&pk(), &DocumentId::new("campus")).unwrap();
    let read_b = read_a.clone();

    let spawn_writer = |read: Document, new_id: &'static str| {
        let store = store.clone();
        tokio::spawn(async move {
            let mut batch = TransactionalBatch::new(&store, pk());
            batch.update_item(read, doc(new_id))?;
            batch.execute().await
        })
    };

    let a = spawn_writer(read_a, "campus-by-a");
    let b = spawn_writer(read_b, "campus-by-b");
    let results = vec![a.await.unwrap(), b.await.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_conflict()))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);

    let a_written = store.get(&pk(), &DocumentId::new("campus-by-a")).is_some();
    let b_written = store.get(&pk(), &DocumentId::new("campus-by-b")).is_some();
    assert!(a_written ^ b_written);
}

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn update_without_revision_is_rejected() {
    let mut acc = BatchAccumulator::new(pk());
    let err = acc.update_item(doc("never-read"), doc("new")).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(acc.is_empty());
}

#[test]
fn update_with_empty_ids_is_rejected() {
    let mut acc = BatchAccumulator::new(pk());
    assert!(acc.update_item(read_doc("", "r"), doc("new")).unwrap_err().is_invalid_input());
    assert!(acc.update_item(read_doc("old", "r"), doc("")).unwrap_err().is_invalid_input());
    assert_eq!(acc.operation_count(), 0);
}

#[test]
fn rejected_request_leaves_earlier_requests_intact() {
    let mut acc = BatchAccumulator::new(pk());
    acc.create_item(doc("a")).unwrap();
    acc.update_item(read_doc("b", "r"), doc("c")).unwrap();
    assert!(acc.update_item(doc("d"), doc("e")).is_err());
    acc.upsert_item(doc("f")).unwrap();

    let ids: Vec<&str> = acc
        .chunks()
        .iter()
        .flat_map(|c| c.operations())
        .map(|op| op.document_id().as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c", "f"]);
}
