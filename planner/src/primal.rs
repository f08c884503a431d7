use std::collections::HashMap;

use bebsched_structs::{
    plan::{Schedule, VehiclePath},
    problem::VehicleArc,
    NodeId,
};

use serde::Serialize;

use crate::{
    error::LagrangeError,
    network::{Network, SubNetwork},
};

/// Path indicators of every vehicle. `x[u]` runs parallel to the arcs of
/// block `u`'s sub-network, `z[b]` parallel to the full arc list.
#[derive(Debug, Clone, PartialEq)]
pub struct Primal {
    pub x: Vec<Vec<bool>>,
    pub z: Vec<Vec<bool>>,
}

impl Primal {
    pub fn zeros(network: &Network) -> Self {
        Primal {
            x: network.block_networks.iter().map(|s| vec![false; s.arcs.len()]).collect(),
            z: network.backups.iter().map(|_| vec![false; network.arcs.len()]).collect(),
        }
    }

    /// Indicators from a known solution. Arc keys are normalized like the
    /// network's own arcs, so an arc into the source means the sink.
    pub fn warm_start(
        network: &Network,
        x_init: Option<&[VehicleArc]>,
        z_init: Option<&[VehicleArc]>,
    ) -> Result<Self, LagrangeError> {
        let mut primal = Primal::zeros(network);

        let block_pos: HashMap<u32, usize> = network.blocks.iter().enumerate().map(|(i, u)| (*u, i)).collect();
        for entry in x_init.unwrap_or_default() {
            let u = *block_pos
                .get(&entry.vehicle)
                .ok_or(LagrangeError::UnknownVehicle(entry.vehicle))?;
            let pos = network
                .arc_idx(&entry.arc)
                .and_then(|a| network.block_networks[u].arc_position(a))
                .ok_or(LagrangeError::WarmStartArc { vehicle: entry.vehicle, arc: entry.arc })?;
            primal.x[u][pos] = true;
        }

        let backup_pos: HashMap<u32, usize> = network.backups.iter().enumerate().map(|(i, b)| (*b, i)).collect();
        for entry in z_init.unwrap_or_default() {
            let b = *backup_pos
                .get(&entry.vehicle)
                .ok_or(LagrangeError::UnknownVehicle(entry.vehicle))?;
            let arc = network
                .arc_idx(&entry.arc)
                .ok_or(LagrangeError::WarmStartArc { vehicle: entry.vehicle, arc: entry.arc })?;
            primal.z[b][arc as usize] = true;
        }

        Ok(primal)
    }

    /// Indicators of freshly solved paths (given as positions in each
    /// vehicle's sub-network arcs).
    pub fn from_paths(network: &Network, block_paths: &[Vec<u32>], backup_paths: &[Vec<u32>]) -> Self {
        let mut primal = Primal::zeros(network);
        for (u, path) in block_paths.iter().enumerate() {
            for pos in path.iter() {
                primal.x[u][*pos as usize] = true;
            }
        }
        for (b, path) in backup_paths.iter().enumerate() {
            for pos in path.iter() {
                primal.z[b][network.full.arcs[*pos as usize] as usize] = true;
            }
        }
        primal
    }

    pub fn block_energy(&self, network: &Network, u: usize) -> f64 {
        used_energy(network, &network.block_networks[u], &self.x[u])
    }

    pub fn backup_energy(&self, network: &Network, b: usize) -> f64 {
        used_energy(network, &network.full, &self.z[b])
    }
}

fn used_energy(network: &Network, sub: &SubNetwork, used: &[bool]) -> f64 {
    sub.arcs
        .iter()
        .zip(used.iter())
        .filter(|(_, x)| **x)
        .map(|(a, _)| network.kwh(*a))
        .sum()
}

pub fn schedule(network: &Network, block_paths: &[Vec<u32>], backup_paths: &[Vec<u32>]) -> Schedule {
    Schedule {
        block_paths: network
            .blocks
            .iter()
            .zip(block_paths.iter())
            .zip(network.block_networks.iter())
            .map(|((u, path), sub)| VehiclePath {
                vehicle: *u,
                nodes: network.path_nodes(sub, path),
            })
            .collect(),
        backup_paths: network
            .backups
            .iter()
            .zip(backup_paths.iter())
            .map(|(b, path)| VehiclePath {
                vehicle: *b,
                nodes: network.path_nodes(&network.full, path),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VehicleRef {
    Block(u32),
    Backup(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyViolation {
    pub vehicle: VehicleRef,
    pub used: f64,
    pub budget: f64,
}

/// How far a schedule is from being operable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleCheck {
    pub uncovered: Vec<NodeId>,
    pub overcovered: Vec<NodeId>,
    pub over_budget: Vec<EnergyViolation>,
}

impl ScheduleCheck {
    pub fn is_feasible(&self) -> bool {
        self.uncovered.is_empty() && self.overcovered.is_empty() && self.over_budget.is_empty()
    }
}

pub fn check_schedule(network: &Network, schedule: &Schedule) -> ScheduleCheck {
    let mut visits: HashMap<NodeId, usize> = HashMap::new();
    for path in schedule.block_paths.iter().chain(schedule.backup_paths.iter()) {
        for trip in path.trips() {
            *visits.entry(*trip).or_default() += 1;
        }
    }

    let mut check = ScheduleCheck::default();
    for node in network.nodes.iter().filter(|n| !n.is_sentinel()) {
        match visits.get(node).copied().unwrap_or(0) {
            0 => check.uncovered.push(*node),
            1 => {}
            _ => check.overcovered.push(*node),
        }
    }

    let path_energy = |path: &VehiclePath| -> f64 {
        path.nodes
            .windows(2)
            .filter_map(|w| network.arc_idx(&bebsched_structs::ArcKey::new(w[0], w[1])))
            .map(|a| network.kwh(a))
            .sum()
    };

    for (path, budget) in schedule.block_paths.iter().zip(network.orig_kwh.iter()) {
        let used = path_energy(path);
        if used > *budget {
            check.over_budget.push(EnergyViolation { vehicle: VehicleRef::Block(path.vehicle), used, budget: *budget });
        }
    }
    for (path, budget) in schedule.backup_paths.iter().zip(network.bu_kwh.iter()) {
        let used = path_energy(path);
        if used > *budget {
            check.over_budget.push(EnergyViolation { vehicle: VehicleRef::Backup(path.vehicle), used, budget: *budget });
        }
    }

    check
}
