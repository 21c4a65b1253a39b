//! In-memory trace model: one entry per chiplet plus the header metadata.
//!
//! Built once by the parser (or by hand in tests) and afterwards only mutated
//! by the engine, which removes operations from the chiplet queues.

pub mod chiplet;
pub mod op;

pub use chiplet::{Chiplet, Computation};
pub use op::{OpKind, Operation, Peer};

use serde::Serialize;
use std::collections::BTreeMap;

pub type NodeId = u32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Trace {
    /// Mesh as written in the header, e.g. `4x4`.
    pub mesh: String,
    pub network: String,
    pub total_batch: u64,
    pub total_chiplets: u64,
    /// Keyed by chiplet id; iteration is in ascending id order.
    pub chiplets: BTreeMap<NodeId, Chiplet>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chiplet, replacing any previous chiplet with the same id.
    pub fn insert(&mut self, chiplet: Chiplet) -> Option<Chiplet> {
        self.chiplets.insert(chiplet.id, chiplet)
    }

    pub fn with_chiplet(mut self, chiplet: Chiplet) -> Self {
        self.insert(chiplet);
        self
    }

    pub fn chiplet(&self, id: NodeId) -> Option<&Chiplet> {
        self.chiplets.get(&id)
    }

    /// Total number of queued operations across all chiplets.
    pub fn operation_count(&self) -> usize {
        self.chiplets.values().map(|c| c.operations.len()).sum()
    }

    /// `(rows, cols)` from a `RxC` mesh string, if it is well formed.
    pub fn mesh_shape(&self) -> Option<(u32, u32)> {
        let (rows, cols) = self.mesh.split_once('x')?;
        Some((rows.trim().parse().ok()?, cols.trim().parse().ok()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_shape() {
        let mut trace = Trace::new();
        trace.mesh = "4x2".to_string();
        assert_eq!(trace.mesh_shape(), Some((4, 2)));
        trace.mesh = "four".to_string();
        assert_eq!(trace.mesh_shape(), None);
    }

    #[test]
    fn operation_count_sums_queues() {
        let trace = Trace::new()
            .with_chiplet(Chiplet::new(0, 0, 0).with_operations([Operation::send(0, 1, "T0")]))
            .with_chiplet(Chiplet::new(1, 0, 1).with_operations([
                Operation::compute(0, "conv1"),
                Operation::recv(1, 0, "T0"),
            ]));
        assert_eq!(trace.operation_count(), 3);
        assert_eq!(trace.chiplet(1).and_then(Chiplet::front).map(|o| o.kind), Some(OpKind::Compute));
    }
}
