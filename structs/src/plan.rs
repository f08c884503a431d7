use serde::{Deserialize, Serialize};

use crate::{NodeId, SINK, SOURCE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclePath {
    pub vehicle: u32,
    pub nodes: Vec<NodeId>,
}

impl VehiclePath {
    /// Goes straight from the source to the sink without serving any trip.
    pub fn is_idle(&self) -> bool {
        self.nodes.as_slice() == [SOURCE, SINK]
    }

    pub fn trips(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().filter(|n| !n.is_sentinel())
    }
}

/// Vehicle paths of one subgradient iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub block_paths: Vec<VehiclePath>,
    pub backup_paths: Vec<VehiclePath>,
}

impl Schedule {
    pub fn active_backups(&self) -> usize {
        self.backup_paths.iter().filter(|p| !p.is_idle()).count()
    }

    pub fn print(&self) {
        for p in self.block_paths.iter() {
            println!("block {}", p.vehicle);
            for n in p.nodes.iter() {
                println!("  - {}", n);
            }
        }
        for p in self.backup_paths.iter().filter(|p| !p.is_idle()) {
            println!("backup {}", p.vehicle);
            for n in p.nodes.iter() {
                println!("  - {}", n);
            }
        }
    }
}
