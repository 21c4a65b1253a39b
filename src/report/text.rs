//! Plain-text rendering for the command line.

use crate::Result;
use crate::engine::Verdict;
use crate::report::EliminationReport;
use crate::trace::{NodeId, Trace};
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub fn render_text(report: &EliminationReport) -> Result<String> {
    let mut out = String::new();
    let t = &report.totals;

    writeln!(
        out,
        "Network: {}  Mesh: {}  Chiplets: {}",
        report.network, report.mesh, report.chiplets
    )?;
    writeln!(out, "Operations:       {}", t.operations_before)?;
    writeln!(out, "After filtering:  {}", t.operations_after_filter)?;
    writeln!(out, "Eliminated pairs: {}", t.eliminated_pairs)?;
    writeln!(out, "Residual:         {}", t.residual_operations)?;

    if report.residue.is_empty() {
        writeln!(out, "All matched operations eliminated; no residue.")?;
    } else {
        for r in &report.residue {
            // The front is what blocks the rest of the queue.
            writeln!(
                out,
                "  chiplet {} ({},{}): {} left, front {}",
                r.id,
                r.row,
                r.col,
                r.remaining.len(),
                r.remaining[0]
            )?;
        }
    }

    if !report.fixpoint {
        writeln!(out, "WARN: eliminable pairs remain")?;
    }

    Ok(out)
}

/// Header metadata plus computation/operation counts per chiplet.
pub fn render_summary(trace: &Trace) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Mesh: {}", trace.mesh)?;
    writeln!(out, "Network: {}", trace.network)?;
    writeln!(out, "Total Batch: {}", trace.total_batch)?;
    writeln!(out, "Total Chiplets: {}", trace.total_chiplets)?;
    writeln!(out, "Parsed {} chiplets", trace.chiplets.len())?;
    for c in trace.chiplets.values() {
        writeln!(
            out,
            "  chiplet {} ({},{}): {} computations, {} operations",
            c.id,
            c.row,
            c.col,
            c.computations.len(),
            c.operations.len()
        )?;
    }
    Ok(out)
}

/// Per-chiplet operation counts before and after some in-place change.
pub fn render_counts(before: &BTreeMap<NodeId, usize>, after: &Trace) -> Result<String> {
    let mut out = String::new();
    for (id, c) in &after.chiplets {
        let was = before.get(id).copied().unwrap_or(0);
        writeln!(out, "  chiplet {}: {} -> {} operations", id, was, c.operations.len())?;
    }
    writeln!(
        out,
        "Total: {} -> {}",
        before.values().sum::<usize>(),
        after.operation_count()
    )?;
    Ok(out)
}

pub fn render_verdict(verdict: &Verdict) -> Result<String> {
    let mut out = String::new();
    match verdict {
        Verdict::DeadlockFree => writeln!(out, "Schedule is deadlock-free.")?,
        Verdict::Deadlocked { blocked } => {
            writeln!(out, "Deadlock: no operation can make progress at the head of:")?;
            for b in blocked {
                writeln!(out, "  chiplet {}: {} ({} queued)", b.chiplet, b.front, b.queued)?;
            }
        }
    }
    Ok(out)
}
