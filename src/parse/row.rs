//! Single `|`-separated rows inside a chiplet block.

use crate::trace::{Computation, OpKind, Operation, Peer};
use anyhow::{Context, bail};

const COMPUTATION_FIELDS: usize = 13;
const OPERATION_FIELDS: usize = 6;

fn split_fields(line: &str) -> Vec<&str> {
    line.split('|').map(str::trim).collect()
}

/// Parse an `[ORDERED_OPERATIONS]` row.
///
/// Columns: Seq | Type | Peer | Layer | Size | TransferID
pub fn parse_operation_row(line: &str) -> anyhow::Result<Operation> {
    let f = split_fields(line);
    if f.len() < OPERATION_FIELDS {
        bail!("expected {} fields, found {}", OPERATION_FIELDS, f.len());
    }

    let seq: u64 = f[0].parse().with_context(|| format!("bad seq {:?}", f[0]))?;
    let kind: OpKind = f[1].parse()?;
    let size: u64 = f[4].parse().with_context(|| format!("bad size {:?}", f[4]))?;

    Ok(Operation {
        seq,
        kind,
        peer: Peer::parse(f[2]),
        layer: f[3].to_string(),
        size,
        transfer_id: f[5].to_string(),
    })
}

/// Parse a `[COMPUTATIONS]` row.
///
/// Columns: Layer | Type | IFMAP_H | IFMAP_W | Filter_H | Filter_W | Channels
///          | NumFilters | Stride_H | Stride_W | Extra | Batch | OutputRange
pub fn parse_computation_row(line: &str) -> anyhow::Result<Computation> {
    let f = split_fields(line);
    if f.len() < COMPUTATION_FIELDS {
        bail!("expected {} fields, found {}", COMPUTATION_FIELDS, f.len());
    }

    let num = |idx: usize, field: &str| -> anyhow::Result<u64> {
        f[idx]
            .parse()
            .with_context(|| format!("bad {} {:?}", field, f[idx]))
    };

    Ok(Computation {
        layer: f[0].to_string(),
        layer_type: f[1].to_string(),
        ifmap_h: num(2, "ifmap_h")?,
        ifmap_w: num(3, "ifmap_w")?,
        filter_h: num(4, "filter_h")?,
        filter_w: num(5, "filter_w")?,
        channels: num(6, "channels")?,
        num_filters: num(7, "num_filters")?,
        stride_h: num(8, "stride_h")?,
        stride_w: num(9, "stride_w")?,
        extra: f[10].to_string(),
        batch: f[11].to_string(),
        output_range: f[12].to_string(),
    })
}
