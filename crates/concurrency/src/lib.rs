//! Concurrency layer for docbatch
//!
//! This crate implements chunked transactional writes with optimistic
//! concurrency:
//! - Operation / WriteRequest: weighted mutations (create, concurrency-checked replace, upsert)
//! - Chunk: bounded group committed as one atomic unit
//! - BatchAccumulator: order-preserving packing into chunks
//! - ExecutionCoordinator: sequential, fail-fast chunk commits
//! - TransactionalBatch: single-use facade over both
//! - BatchConfig: `docbatch.toml` configuration
//!
//! Cross-chunk atomicity is not provided: a failure in chunk `i` leaves
//! chunks `0..i` applied.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accumulator;
pub mod batch;
pub mod chunk;
pub mod config;
pub mod coordinator;
pub mod operation;

pub use accumulator::BatchAccumulator;
pub use batch::TransactionalBatch;
pub use chunk::Chunk;
pub use config::{BatchConfig, CONFIG_FILE_NAME};
pub use coordinator::{ExecutionCoordinator, ExecutionState};
pub use operation::{Operation, OperationKind, WriteRequest};
