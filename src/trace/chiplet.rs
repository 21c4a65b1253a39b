use crate::trace::{NodeId, Operation};
use serde::Serialize;
use std::collections::VecDeque;

/// One row of a chiplet's `[COMPUTATIONS]` section. Carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Computation {
    pub layer: String,
    pub layer_type: String,
    pub ifmap_h: u64,
    pub ifmap_w: u64,
    pub filter_h: u64,
    pub filter_w: u64,
    pub channels: u64,
    pub num_filters: u64,
    pub stride_h: u64,
    pub stride_w: u64,
    pub extra: String,
    pub batch: String,
    pub output_range: String,
}

/// A chiplet at fixed mesh coordinates with its ordered operation queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chiplet {
    pub id: NodeId,
    pub row: u32,
    pub col: u32,
    pub computations: Vec<Computation>,
    /// Front (index 0) is the next operation to be consumed.
    pub operations: VecDeque<Operation>,
}

impl Chiplet {
    pub fn new(id: NodeId, row: u32, col: u32) -> Self {
        Self {
            id,
            row,
            col,
            computations: Vec::new(),
            operations: VecDeque::new(),
        }
    }

    pub fn with_operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(ops);
        self
    }

    pub fn front(&self) -> Option<&Operation> {
        self.operations.front()
    }
}
