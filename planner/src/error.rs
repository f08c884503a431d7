use bebsched_structs::{ArcKey, NodeId};
use thiserror::Error;

/// Everything that can stop a bound computation. Apart from `Finished`, all of
/// these are input or configuration defects and none is worth retrying.
#[derive(Debug, Error)]
pub enum LagrangeError {
    #[error("arc {arc} references node {node}, which is neither a trip nor a depot sentinel")]
    UnknownNode { arc: ArcKey, node: NodeId },

    #[error("trip node {0} is listed more than once")]
    DuplicateNode(NodeId),

    #[error("trip node {0} collides with a depot sentinel")]
    ReservedNode(NodeId),

    #[error("vehicle id {0} is reserved for the depot sentinels")]
    ReservedVehicleId(u32),

    #[error("arc {0} appears more than once (after mapping source destinations to the sink)")]
    DuplicateArc(ArcKey),

    #[error("arc {arc} has invalid weight {kwh}")]
    InvalidWeight { arc: ArcKey, kwh: f64 },

    #[error("vehicle {0} is listed more than once among blocks and backups")]
    DuplicateVehicle(u32),

    #[error("no energy budget given for vehicle {0}")]
    MissingBudget(u32),

    #[error("vehicle {0} is neither a block nor a backup")]
    UnknownVehicle(u32),

    #[error("warm start uses arc {arc}, which is outside the sub-network of vehicle {vehicle}")]
    WarmStartArc { vehicle: u32, arc: ArcKey },

    #[error("unrecognized step size method {0:?}")]
    UnknownStepMethod(String),

    #[error("step size constant must be positive and finite, got {0}")]
    InvalidStepConstant(f64),

    #[error("solver already finished after {iterations} iterations")]
    Finished { iterations: usize },

    #[error("no path from source to sink for vehicle {vehicle}")]
    NoPath { vehicle: u32 },

    #[error("negative cycle reachable from source for vehicle {vehicle}")]
    NegativeCycle { vehicle: u32 },
}
