use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ArcKey, NodeId};

/// Everything the bound computation needs, fully parsed. Produced by the
/// data-processing side (GTFS cleaning, deadhead distances, exact model warm
/// starts) and handed over as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Trip nodes. A block owns the trips carrying its id.
    pub trips: Vec<NodeId>,
    pub blocks: Vec<u32>,
    pub backups: Vec<u32>,
    pub arcs: Vec<ArcEntry>,
    /// Energy budget per regular block (kWh).
    pub orig_kwh: BTreeMap<u32, f64>,
    /// Energy budget per backup bus (kWh).
    pub bu_kwh: BTreeMap<u32, f64>,
    /// Arcs used by each block in a known solution.
    #[serde(default)]
    pub x_init: Option<Vec<VehicleArc>>,
    /// Arcs used by each backup in a known solution.
    #[serde(default)]
    pub z_init: Option<Vec<VehicleArc>>,
    /// Objective of a known integer solution, e.g. from an exact solver.
    #[serde(default)]
    pub upper_bound: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ArcEntry {
    pub from: NodeId,
    pub to: NodeId,
    pub kwh: f64,
}

impl ArcEntry {
    pub fn key(&self) -> ArcKey {
        ArcKey::new(self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleArc {
    pub vehicle: u32,
    pub arc: ArcKey,
}

impl Problem {
    pub fn n_vehicles(&self) -> usize {
        self.blocks.len() + self.backups.len()
    }
}
