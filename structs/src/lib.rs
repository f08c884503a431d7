use serde::{Deserialize, Serialize};

pub mod plan;
pub mod problem;

/// Vehicle id reserved for the two depot sentinels.
pub const SENTINEL_VEHICLE: u32 = 0;

/// Virtual depot node every path starts from.
pub const SOURCE: NodeId = NodeId(SENTINEL_VEHICLE, 0);

/// Virtual depot node every path ends in.
pub const SINK: NodeId = NodeId(SENTINEL_VEHICLE, 1);

/// A node is a (vehicle/block id, sequence index) pair.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(pub u32, pub u32);

impl NodeId {
    pub fn vehicle(&self) -> u32 {
        self.0
    }

    pub fn seq(&self) -> u32 {
        self.1
    }

    pub fn is_sentinel(&self) -> bool {
        *self == SOURCE || *self == SINK
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            SOURCE => write!(f, "source"),
            SINK => write!(f, "sink"),
            NodeId(v, i) => write!(f, "({},{})", v, i),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArcKey {
    pub from: NodeId,
    pub to: NodeId,
}

impl ArcKey {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        ArcKey { from, to }
    }
}

impl std::fmt::Display for ArcKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Input data may encode "return to depot" as an arc into the source. Paths
/// must end in the sink, so such arcs are rewritten to point at the sink.
/// Every arc-keyed input goes through this before it is used.
pub fn normalize_arc(arc: ArcKey) -> ArcKey {
    if arc.to == SOURCE {
        ArcKey { from: arc.from, to: SINK }
    } else {
        arc
    }
}
