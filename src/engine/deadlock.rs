//! Deadlock-freedom check for a whole schedule.
//!
//! Works on a copy: COMPUTE operations and operations with no chiplet peer
//! (DRAM, unset) never wait on anyone and are consumed freely, then the
//! cross-chiplet SEND/RECV pairs are drained. The schedule is deadlock-free
//! iff every queue ends up empty.

use crate::engine::pair;
use crate::trace::{NodeId, Operation, Peer, Trace};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedHead {
    pub chiplet: NodeId,
    pub front: Operation,
    pub queued: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    DeadlockFree,
    /// Blocked queue heads in ascending chiplet id.
    Deadlocked { blocked: Vec<BlockedHead> },
}

impl Verdict {
    pub fn is_deadlock_free(&self) -> bool {
        matches!(self, Verdict::DeadlockFree)
    }
}

pub fn verify_deadlock_free(trace: &Trace) -> Verdict {
    let mut scratch = trace.clone();
    for chiplet in scratch.chiplets.values_mut() {
        chiplet
            .operations
            .retain(|op| !op.is_compute() && !matches!(op.peer, Peer::Dram | Peer::Unset));
    }
    pair::drain_matched_pairs(&mut scratch);

    let blocked: Vec<BlockedHead> = scratch
        .chiplets
        .values()
        .filter_map(|c| {
            c.front().map(|front| BlockedHead {
                chiplet: c.id,
                front: front.clone(),
                queued: c.operations.len(),
            })
        })
        .collect();

    if blocked.is_empty() {
        Verdict::DeadlockFree
    } else {
        Verdict::Deadlocked { blocked }
    }
}
