//! Batch Integration Tests
//!
//! Tests for chunked transactional writes with optimistic concurrency.

mod common;

mod execution;
mod optimistic_concurrency;
