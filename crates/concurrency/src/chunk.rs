//! Bounded groups of operations
//!
//! A [`Chunk`] is submitted to the store as one atomic unit. Its
//! `total_weight` never exceeds the bound it was filled against.

use docbatch_core::AtomicUnit;

use crate::operation::Operation;

/// Ordered operations committed together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    operations: Vec<Operation>,
    total_weight: usize,
}

impl Chunk {
    /// Create an empty chunk
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations in insertion order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Sum of the contained operations' weights
    pub fn total_weight(&self) -> usize {
        self.total_weight
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the chunk holds no operations
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Capacity left under `max_weight`
    pub fn remaining(&self, max_weight: usize) -> usize {
        max_weight.saturating_sub(self.total_weight)
    }

    /// Whether `weight` more fits under `max_weight`
    pub fn fits(&self, weight: usize, max_weight: usize) -> bool {
        weight <= self.remaining(max_weight)
    }

    /// Append a request's operations as one group
    ///
    /// The caller has checked [`Chunk::fits`] for the group's combined weight.
    pub(crate) fn push_group(&mut self, operations: Vec<Operation>) {
        self.total_weight += operations.iter().map(Operation::weight).sum::<usize>();
        self.operations.extend(operations);
    }

    /// Stage every operation onto `unit`, preserving order
    pub fn stage_into<U: AtomicUnit + ?Sized>(self, unit: &mut U) {
        for op in self.operations {
            op.stage_into(unit);
        }
    }
}
