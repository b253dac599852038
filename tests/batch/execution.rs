//! Execution Tests
//!
//! Tests for committing chunks against the store:
//! - Empty batch never contacts the store
//! - Chunks commit in accumulation order
//! - Fail-fast on the first failing chunk
//! - Chunks before the failing one stay applied
//! - Failure classification (Conflict vs Service)

use crate::common::*;
use docbatch::{
    BatchError, CommitOutcome, Document, DocumentId, ExecutionCoordinator, ExecutionState,
    InMemoryDocumentStore, StoreStatus, TransactionalBatch,
};
use serde_json::json;

// ============================================================================
// Success paths
// ============================================================================

#[tokio::test]
async fn empty_batch_succeeds_without_store_contact() {
    let store = ScriptedStore::new();
    let batch = TransactionalBatch::new(&store, pk());
    assert!(batch.accumulator().is_empty());

    batch.execute().await.unwrap();
    assert_eq!(store.commit_count(), 0);
}

#[tokio::test]
async fn chunks_are_submitted_in_order_with_their_operations() {
    let store = ScriptedStore::new();
    let mut batch = TransactionalBatch::new(&store, pk());
    for i in 0..99 {
        batch.create_item(doc(&format!("d{}", i))).unwrap();
    }
    batch.update_item(read_doc("old", "r7"), doc("new")).unwrap();
    batch.upsert_item(doc("last")).unwrap();

    batch.execute().await.unwrap();

    let units = store.units();
    assert_eq!(units.len(), 2);
    assert!(units.iter().all(|(partition, _)| *partition == pk()));
    assert_eq!(units[0].1.len(), 99);
    assert_eq!(units[0].1[0], StagedCall::Create(DocumentId::new("d0")));
    assert_eq!(
        units[1].1,
        vec![
            StagedCall::Replace {
                id: DocumentId::new("old"),
                precondition: "r7".into(),
            },
            StagedCall::Create(DocumentId::new("new")),
            StagedCall::Upsert(DocumentId::new("last")),
        ]
    );
}

#[tokio::test]
async fn large_batch_lands_in_memory_store() {
    let store = InMemoryDocumentStore::new();
    let mut batch = TransactionalBatch::new(&store, pk());
    for i in 0..250 {
        batch
            .create_item(Document::new(format!("room-{}", i), json!({"floor": i % 5})))
            .unwrap();
    }
    assert_eq!(batch.accumulator().chunk_count(), 3);

    batch.execute().await.unwrap();
    assert_eq!(store.len(&pk()), 250);
    assert_eq!(store.commit_count(), 3);
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn precondition_failure_raises_conflict_and_stops() {
    let store = ScriptedStore::with_outcomes(vec![
        CommitOutcome::Committed,
        CommitOutcome::PreconditionFailed {
            document_id: Some(DocumentId::new("o60")),
            detail: "etag mismatch".to_string(),
        },
    ]);
    let mut batch = TransactionalBatch::new(&store, pk());
    // 150 updates -> 3 chunks of 50 pairs
    for i in 0..150 {
        batch
            .update_item(read_doc(&format!("o{}", i), "r"), doc(&format!("n{}", i)))
            .unwrap();
    }
    assert_eq!(batch.accumulator().chunk_count(), 3);

    let err = batch.execute().await.unwrap_err();
    match &err {
        BatchError::Conflict { document_id, message } => {
            assert_eq!(document_id.as_ref(), Some(&DocumentId::new("o60")));
            assert!(message.contains("reload"));
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    // Chunk 3 was never attempted
    assert_eq!(store.commit_count(), 2);
}

#[tokio::test]
async fn other_failure_raises_service_with_status_detail() {
    let store = ScriptedStore::with_outcomes(vec![CommitOutcome::Failed {
        status: StoreStatus::TooManyRequests,
        detail: "request rate is large".to_string(),
    }]);
    let mut batch = TransactionalBatch::new(&store, pk());
    for i in 0..120 {
        batch.upsert_item(doc(&format!("d{}", i))).unwrap();
    }

    let err = batch.execute().await.unwrap_err();
    assert!(err.is_service());
    let msg = err.to_string();
    assert!(msg.contains("TooManyRequests (429)"));
    assert!(msg.contains("request rate is large"));
    assert_eq!(store.commit_count(), 1);
}

#[tokio::test]
async fn earlier_chunks_stay_applied_after_conflict() {
    let store = InMemoryDocumentStore::new();
    let stale = store.put(&pk(), Document::new("campus", json!({"v": 1})));
    // Another writer updates the campus after we read it
    store.put(&pk(), Document::new("campus", json!({"v": 2})));

    let mut batch = TransactionalBatch::new(&store, pk());
    for i in 0..100 {
        batch.create_item(doc(&format!("room-{}", i))).unwrap();
    }
    batch
        .update_item(
            Document::with_revision("campus", stale, json!({"v": 1})),
            doc("campus-renamed"),
        )
        .unwrap();
    assert_eq!(batch.accumulator().chunk_count(), 2);

    let err = batch.execute().await.unwrap_err();
    assert!(err.is_conflict());

    // Chunk 1 is durably applied; chunk 2 applied nothing
    assert!(store.get(&pk(), &DocumentId::new("room-0")).is_some());
    assert!(store.get(&pk(), &DocumentId::new("room-99")).is_some());
    assert!(store.get(&pk(), &DocumentId::new("campus-renamed")).is_none());
    assert_eq!(
        store.get(&pk(), &DocumentId::new("campus")).unwrap().body,
        json!({"v": 2})
    );
}

#[tokio::test]
async fn duplicate_create_is_service_error() {
    let store = InMemoryDocumentStore::new();
    store.put(&pk(), doc("taken"));

    let mut batch = TransactionalBatch::new(&store, pk());
    batch.create_item(doc("taken")).unwrap();

    let err = batch.execute().await.unwrap_err();
    assert!(err.is_service());
    assert!(err.to_string().contains("409"));
}

#[tokio::test]
async fn coordinator_reports_state_and_applied_chunks() {
    let store = ScriptedStore::with_outcomes(vec![
        CommitOutcome::Committed,
        CommitOutcome::Committed,
        CommitOutcome::Failed {
            status: StoreStatus::ServiceUnavailable,
            detail: "connection reset".to_string(),
        },
    ]);
    let mut acc = docbatch::BatchAccumulator::with_limits(pk(), docbatch::Limits::with_max_chunk_weight(2));
    for i in 0..8 {
        acc.create_item(doc(&format!("d{}", i))).unwrap();
    }

    let mut coordinator = ExecutionCoordinator::new(&store, pk());
    let err = coordinator.execute(acc.into_chunks()).await.unwrap_err();

    assert!(err.is_service());
    assert_eq!(coordinator.state(), ExecutionState::Failed);
    assert!(coordinator.state().is_terminal());
    assert_eq!(coordinator.committed_chunks(), 2);
    assert_eq!(store.commit_count(), 3);
}
