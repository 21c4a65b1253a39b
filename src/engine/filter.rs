use crate::trace::Trace;

/// Drop every COMPUTE operation from every chiplet, keeping queue order.
pub fn remove_compute_operations(trace: &mut Trace) {
    for chiplet in trace.chiplets.values_mut() {
        chiplet.operations.retain(|op| !op.is_compute());
    }
}

/// Drop every operation whose peer is DRAM, whatever its kind.
pub fn remove_dram_operations(trace: &mut Trace) {
    for chiplet in trace.chiplets.values_mut() {
        chiplet.operations.retain(|op| !op.peer.is_dram());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Chiplet, OpKind, Operation, Peer};
    use pretty_assertions::assert_eq;

    fn mixed_trace() -> Trace {
        Trace::new()
            .with_chiplet(Chiplet::new(0, 0, 0).with_operations([
                Operation::new(0, OpKind::Recv, Peer::Dram, "conv1_ifmap", 1024, "T0"),
                Operation::compute(1, "conv1"),
                Operation::send(2, 1, "T2"),
                Operation::new(3, OpKind::Send, Peer::Dram, "conv1_ofmap", 512, "T4"),
            ]))
            .with_chiplet(Chiplet::new(1, 0, 1).with_operations([
                Operation::recv(0, 0, "T2"),
                Operation::compute(1, "conv2"),
                // Violates the usual shape (COMPUTE with a DRAM peer); either rule drops it.
                Operation::new(2, OpKind::Compute, Peer::Dram, "odd", 0, "T-1"),
            ]))
    }

    fn seqs(trace: &Trace, id: u32) -> Vec<u64> {
        trace.chiplets[&id].operations.iter().map(|o| o.seq).collect()
    }

    #[test]
    fn compute_filter_keeps_order_and_seq() {
        let mut trace = mixed_trace();
        remove_compute_operations(&mut trace);
        assert_eq!(seqs(&trace, 0), vec![0, 2, 3]);
        assert_eq!(seqs(&trace, 1), vec![0]);
    }

    #[test]
    fn dram_filter_drops_any_kind() {
        let mut trace = mixed_trace();
        remove_dram_operations(&mut trace);
        assert_eq!(seqs(&trace, 0), vec![1, 2]);
        assert_eq!(seqs(&trace, 1), vec![0, 1]);
    }

    #[test]
    fn filters_are_idempotent() {
        let mut once = mixed_trace();
        remove_compute_operations(&mut once);
        let mut twice = once.clone();
        remove_compute_operations(&mut twice);
        assert_eq!(once, twice);

        let mut once = mixed_trace();
        remove_dram_operations(&mut once);
        let mut twice = once.clone();
        remove_dram_operations(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn filters_commute() {
        let mut a = mixed_trace();
        remove_compute_operations(&mut a);
        remove_dram_operations(&mut a);

        let mut b = mixed_trace();
        remove_dram_operations(&mut b);
        remove_compute_operations(&mut b);

        assert_eq!(a, b);
        assert_eq!(seqs(&a, 0), vec![2]);
        assert_eq!(seqs(&a, 1), vec![0]);
    }

    #[test]
    fn empty_trace_is_fine() {
        let mut trace = Trace::new();
        remove_compute_operations(&mut trace);
        remove_dram_operations(&mut trace);
        assert_eq!(trace, Trace::new());
    }
}
