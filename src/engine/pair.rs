//! Pair elimination: cancel a SEND at the front of one queue against the
//! matching RECV at the front of its peer's queue, until nothing matches.
//!
//! A pair (A, B) is eliminable when
//! - A's front is `SEND` with peer B (any numeric spelling of B),
//! - B's front is `RECV` with peer A, written exactly as A's id,
//! - both fronts carry the same transfer id.
//!
//! Only queue fronts are ever inspected and a match pops both fronts, so the
//! set of reachable eliminations is confluent: the final residue does not
//! depend on the order in which matches are found.

use crate::engine::filter;
use crate::trace::{NodeId, OpKind, Trace};
use log::debug;
use std::collections::BTreeSet;

/// Filter out COMPUTE and DRAM operations, then eliminate matched pairs until
/// a fixpoint. Returns the number of eliminated pairs.
pub fn eliminate_matched_pairs(trace: &mut Trace) -> usize {
    filter::remove_compute_operations(trace);
    filter::remove_dram_operations(trace);

    let before = trace.operation_count();
    let eliminated = drain_matched_pairs(trace);
    debug!(
        "eliminated {} pairs, {} of {} operations left",
        eliminated,
        trace.operation_count(),
        before
    );
    eliminated
}

/// The first eliminable (sender, receiver) pair in ascending sender id, if any.
pub fn find_eliminable_pair(trace: &Trace) -> Option<(NodeId, NodeId)> {
    trace
        .chiplets
        .keys()
        .find_map(|&id| eliminable_peer(trace, id).map(|peer| (id, peer)))
}

pub fn is_fixpoint(trace: &Trace) -> bool {
    find_eliminable_pair(trace).is_none()
}

/// Work-list version of the "rescan from the top after every match" loop.
///
/// A match can only appear when a front changes. When the front of X changes,
/// X itself may now lead with a SEND, and if its new front is a RECV from C
/// then C's waiting SEND may now match, so both are re-queued.
pub(crate) fn drain_matched_pairs(trace: &mut Trace) -> usize {
    let mut pending: BTreeSet<NodeId> = trace.chiplets.keys().copied().collect();
    let mut eliminated = 0;

    while let Some(sender) = pending.pop_first() {
        let Some(receiver) = eliminable_peer(trace, sender) else {
            continue;
        };

        for id in [sender, receiver] {
            if let Some(chiplet) = trace.chiplets.get_mut(&id) {
                chiplet.operations.pop_front();
            }
        }
        eliminated += 1;

        for id in [sender, receiver] {
            pending.insert(id);
            if let Some(source) = waiting_on(trace, id) {
                pending.insert(source);
            }
        }
    }

    eliminated
}

/// Peer of `sender` that would cancel against `sender`'s front right now.
fn eliminable_peer(trace: &Trace, sender: NodeId) -> Option<NodeId> {
    let front = trace.chiplets.get(&sender)?.front()?;
    if front.kind != OpKind::Send {
        return None;
    }
    let receiver = front.peer.send_target()?;
    let peer_front = trace.chiplets.get(&receiver)?.front()?;

    let matched = peer_front.kind == OpKind::Recv
        && peer_front.peer.node_id() == Some(sender)
        && peer_front.transfer_id == front.transfer_id;
    matched.then_some(receiver)
}

/// If `id`'s front is a RECV from another chiplet, that chiplet's id.
fn waiting_on(trace: &Trace, id: NodeId) -> Option<NodeId> {
    let front = trace.chiplets.get(&id)?.front()?;
    match front.kind {
        OpKind::Recv => front.peer.node_id(),
        _ => None,
    }
}
