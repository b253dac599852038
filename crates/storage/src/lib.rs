//! Storage layer for docbatch
//!
//! This crate implements the in-memory document store:
//! - InMemoryDocumentStore: DashMap-sharded partitions with FxHashMap per partition
//! - InMemoryUnit: all-or-nothing atomic units with revision preconditions
//! - Store-assigned opaque revisions (UUID v4 strings)
//!
//! It backs the integration tests and serves embedders that want batching
//! semantics without an external store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sharded;

pub use sharded::{InMemoryDocumentStore, InMemoryUnit};
