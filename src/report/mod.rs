//! Result of an elimination run: totals plus the per-chiplet residue.

pub mod text;

pub use text::{render_counts, render_summary, render_text, render_verdict};

use crate::Result;
use crate::engine::{self, filter};
use crate::trace::{NodeId, Operation, Trace};
use anyhow::ensure;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EliminationReport {
    pub network: String,
    pub mesh: String,
    pub chiplets: usize,
    pub totals: TotalsView,
    /// No eliminable pair is left anywhere in the trace.
    pub fixpoint: bool,
    /// Chiplets with a non-empty queue, in ascending id.
    pub residue: Vec<ResidueView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsView {
    pub operations_before: usize,
    pub operations_after_filter: usize,
    pub eliminated_pairs: usize,
    pub residual_operations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidueView {
    pub id: NodeId,
    pub row: u32,
    pub col: u32,
    pub remaining: Vec<Operation>,
}

impl EliminationReport {
    /// Filter and eliminate in place, then describe what is left.
    ///
    /// Fails only if the operation counts do not add up, which would mean the
    /// engine dropped or duplicated something.
    pub fn run(trace: &mut Trace) -> Result<Self> {
        let operations_before = trace.operation_count();

        filter::remove_compute_operations(trace);
        filter::remove_dram_operations(trace);
        let operations_after_filter = trace.operation_count();

        let eliminated_pairs = engine::eliminate_matched_pairs(trace);
        let residual_operations = trace.operation_count();

        ensure!(
            operations_after_filter == residual_operations + 2 * eliminated_pairs,
            "operation count mismatch: {} after filtering, {} eliminated pairs, {} left",
            operations_after_filter,
            eliminated_pairs,
            residual_operations
        );

        let residue = trace
            .chiplets
            .values()
            .filter(|c| !c.operations.is_empty())
            .map(|c| ResidueView {
                id: c.id,
                row: c.row,
                col: c.col,
                remaining: c.operations.iter().cloned().collect(),
            })
            .collect();

        Ok(Self {
            network: trace.network.clone(),
            mesh: trace.mesh.clone(),
            chiplets: trace.chiplets.len(),
            totals: TotalsView {
                operations_before,
                operations_after_filter,
                eliminated_pairs,
                residual_operations,
            },
            fixpoint: engine::is_fixpoint(trace),
            residue,
        })
    }
}
