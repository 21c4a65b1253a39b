//! Operation rows from a chiplet's `[ORDERED_OPERATIONS]` section.
//!
//! Example row:
//!     2 | SEND    |    1 | conv1_to_conv2 |      512 | T3

use crate::trace::NodeId;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpKind {
    Send,
    Recv,
    Compute,
}

impl FromStr for OpKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "SEND" => Ok(OpKind::Send),
            "RECV" => Ok(OpKind::Recv),
            "COMPUTE" => Ok(OpKind::Compute),
            other => anyhow::bail!("unknown operation kind {:?}", other),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpKind::Send => "SEND",
            OpKind::Recv => "RECV",
            OpKind::Compute => "COMPUTE",
        })
    }
}

/// Who is on the other end of an operation.
///
/// The trace writes a chiplet id, the literal `DRAM`, or `-` for operations
/// without a peer. Anything else, including ids not written in canonical
/// decimal form (`00`, `+1`), is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Peer {
    Node(NodeId),
    Dram,
    Unset,
    Other(String),
}

impl Peer {
    /// Parse a peer token. Never fails: unknown tokens become `Peer::Other`.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token {
            "DRAM" => Peer::Dram,
            "" | "-" => Peer::Unset,
            _ => match token.parse::<NodeId>() {
                Ok(id) if id.to_string() == token => Peer::Node(id),
                _ => Peer::Other(token.to_string()),
            },
        }
    }

    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Peer::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// Chiplet a SEND is addressed to. Unlike `node_id`, this also reads
    /// non-canonical numeric tokens such as `01` or `+1`.
    pub fn send_target(&self) -> Option<NodeId> {
        match self {
            Peer::Node(id) => Some(*id),
            Peer::Other(raw) => raw.parse().ok(),
            _ => None,
        }
    }

    pub fn is_dram(&self) -> bool {
        matches!(self, Peer::Dram)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::Node(id) => write!(f, "{}", id),
            Peer::Dram => f.write_str("DRAM"),
            Peer::Unset => f.write_str("-"),
            Peer::Other(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Peer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// Sequence number as emitted by the simulator. Not renumbered by filtering.
    pub seq: u64,
    pub kind: OpKind,
    pub peer: Peer,
    pub layer: String,
    pub size: u64,
    /// Opaque token correlating a SEND with its RECV (e.g. `T12`).
    pub transfer_id: String,
}

impl Operation {
    pub fn new(
        seq: u64,
        kind: OpKind,
        peer: Peer,
        layer: impl Into<String>,
        size: u64,
        transfer_id: impl Into<String>,
    ) -> Self {
        Self {
            seq,
            kind,
            peer,
            layer: layer.into(),
            size,
            transfer_id: transfer_id.into(),
        }
    }

    /// A SEND addressed to chiplet `to`.
    pub fn send(seq: u64, to: NodeId, transfer_id: impl Into<String>) -> Self {
        Self::new(seq, OpKind::Send, Peer::Node(to), "", 0, transfer_id)
    }

    /// A RECV expecting data from chiplet `from`.
    pub fn recv(seq: u64, from: NodeId, transfer_id: impl Into<String>) -> Self {
        Self::new(seq, OpKind::Recv, Peer::Node(from), "", 0, transfer_id)
    }

    pub fn compute(seq: u64, layer: impl Into<String>) -> Self {
        Self::new(seq, OpKind::Compute, Peer::Unset, layer, 0, "T-1")
    }

    pub fn is_compute(&self) -> bool {
        self.kind == OpKind::Compute
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} peer={} tid={}",
            self.seq, self.kind, self.peer, self.transfer_id
        )
    }
}
