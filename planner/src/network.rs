use std::collections::{HashMap, HashSet};

use bebsched_structs::{normalize_arc, problem::Problem, ArcKey, NodeId, SINK, SOURCE};
use log::debug;
use tinyvec::TinyVec;

use crate::error::LagrangeError;

/// Global index of the source node. Also its local index in every sub-network.
pub const SOURCE_IDX: u32 = 0;
/// Global index of the sink node. Also its local index in every sub-network.
pub const SINK_IDX: u32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct Arc {
    pub key: ArcKey,
    pub from: u32,
    pub to: u32,
    pub kwh: f64,
}

/// The part of the network one vehicle may route through.
#[derive(Debug, Clone)]
pub struct SubNetwork {
    /// Global node indices, by local index.
    pub nodes: Vec<u32>,
    /// Global arc indices. Costs and path indicators are parallel to this.
    pub arcs: Vec<u32>,
    /// Per local node: (local target node, position in `arcs`).
    pub outgoing: Vec<TinyVec<[(u32, u32); 8]>>,
    /// Local (from, to) of each arc, by position in `arcs`.
    pub ends: Vec<(u32, u32)>,
}

impl SubNetwork {
    fn new(nodes: Vec<u32>, arcs: Vec<u32>, all_arcs: &[Arc]) -> Self {
        debug_assert!(nodes[SOURCE_IDX as usize] == SOURCE_IDX);
        debug_assert!(nodes[SINK_IDX as usize] == SINK_IDX);
        let local: HashMap<u32, u32> = nodes
            .iter()
            .enumerate()
            .map(|(l, g)| (*g, l as u32))
            .collect();

        let mut outgoing: Vec<TinyVec<[(u32, u32); 8]>> = nodes.iter().map(|_| Default::default()).collect();
        let mut ends = Vec::with_capacity(arcs.len());
        for (pos, a) in arcs.iter().enumerate() {
            let arc = &all_arcs[*a as usize];
            let (from, to) = (local[&arc.from], local[&arc.to]);
            outgoing[from as usize].push((to, pos as u32));
            ends.push((from, to));
        }

        SubNetwork { nodes, arcs, outgoing, ends }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Position in `arcs` of the given global arc, if it belongs here.
    pub fn arc_position(&self, arc_idx: u32) -> Option<usize> {
        self.arcs.iter().position(|a| *a == arc_idx)
    }
}

/// Trips, depot sentinels and arcs, plus the restricted sub-network of every
/// regular block. Backups route through the full network.
#[derive(Debug)]
pub struct Network {
    pub nodes: Vec<NodeId>,
    pub arcs: Vec<Arc>,
    pub blocks: Vec<u32>,
    pub backups: Vec<u32>,
    pub orig_kwh: Vec<f64>,
    pub bu_kwh: Vec<f64>,
    pub block_networks: Vec<SubNetwork>,
    pub full: SubNetwork,
    node_idxs: HashMap<NodeId, u32>,
    arc_idxs: HashMap<ArcKey, u32>,
}

impl Network {
    pub fn new(problem: &Problem) -> Result<Self, LagrangeError> {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("build network");

        let mut nodes = vec![SOURCE, SINK];
        let mut node_idxs: HashMap<NodeId, u32> = HashMap::new();
        node_idxs.insert(SOURCE, SOURCE_IDX);
        node_idxs.insert(SINK, SINK_IDX);
        for trip in problem.trips.iter() {
            if trip.is_sentinel() {
                return Err(LagrangeError::ReservedNode(*trip));
            }
            if node_idxs.insert(*trip, nodes.len() as u32).is_some() {
                return Err(LagrangeError::DuplicateNode(*trip));
            }
            nodes.push(*trip);
        }

        let mut arcs: Vec<Arc> = Vec::with_capacity(problem.arcs.len());
        let mut arc_idxs: HashMap<ArcKey, u32> = HashMap::new();
        for entry in problem.arcs.iter() {
            let key = normalize_arc(entry.key());
            let lookup = |node: NodeId| {
                node_idxs
                    .get(&node)
                    .copied()
                    .ok_or(LagrangeError::UnknownNode { arc: entry.key(), node })
            };
            let (from, to) = (lookup(key.from)?, lookup(key.to)?);
            if !entry.kwh.is_finite() || entry.kwh < 0.0 {
                return Err(LagrangeError::InvalidWeight { arc: key, kwh: entry.kwh });
            }
            if arc_idxs.insert(key, arcs.len() as u32).is_some() {
                return Err(LagrangeError::DuplicateArc(key));
            }
            arcs.push(Arc { key, from, to, kwh: entry.kwh });
        }

        for block in problem.blocks.iter() {
            if *block == bebsched_structs::SENTINEL_VEHICLE {
                return Err(LagrangeError::ReservedVehicleId(*block));
            }
        }
        let mut vehicles: HashSet<u32> = HashSet::new();
        for vehicle in problem.blocks.iter().chain(problem.backups.iter()) {
            if !vehicles.insert(*vehicle) {
                return Err(LagrangeError::DuplicateVehicle(*vehicle));
            }
        }

        let orig_kwh = problem
            .blocks
            .iter()
            .map(|u| problem.orig_kwh.get(u).copied().ok_or(LagrangeError::MissingBudget(*u)))
            .collect::<Result<Vec<_>, _>>()?;
        let bu_kwh = problem
            .backups
            .iter()
            .map(|b| problem.bu_kwh.get(b).copied().ok_or(LagrangeError::MissingBudget(*b)))
            .collect::<Result<Vec<_>, _>>()?;

        let block_networks = block_subnetworks(&problem.blocks, &nodes, &arcs);
        let full = SubNetwork::new(
            (0..nodes.len() as u32).collect(),
            (0..arcs.len() as u32).collect(),
            &arcs,
        );

        debug!(
            "Constructed network with {} nodes, {} arcs, {} blocks, {} backups",
            nodes.len(),
            arcs.len(),
            problem.blocks.len(),
            problem.backups.len()
        );

        Ok(Network {
            nodes,
            arcs,
            blocks: problem.blocks.clone(),
            backups: problem.backups.clone(),
            orig_kwh,
            bu_kwh,
            block_networks,
            full,
            node_idxs,
            arc_idxs,
        })
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_idx(&self, node: &NodeId) -> Option<u32> {
        self.node_idxs.get(node).copied()
    }

    /// Looks up an arc by key. Keys are normalized first, so an arc into the
    /// source is found under its sink form.
    pub fn arc_idx(&self, key: &ArcKey) -> Option<u32> {
        self.arc_idxs.get(&normalize_arc(*key)).copied()
    }

    pub fn kwh(&self, arc_idx: u32) -> f64 {
        self.arcs[arc_idx as usize].kwh
    }

    /// How many paths must leave each node.
    pub fn required_coverage(&self, node_idx: u32) -> f64 {
        match node_idx {
            SOURCE_IDX => (self.blocks.len() + self.backups.len()) as f64,
            SINK_IDX => 0.0,
            _ => 1.0,
        }
    }

    /// Whether an arc counts toward the coverage of its origin when used by a
    /// regular block: only arcs whose destination carries the origin's id.
    pub fn counts_for_block_coverage(&self, arc_idx: u32) -> bool {
        let key = &self.arcs[arc_idx as usize].key;
        key.from.vehicle() == key.to.vehicle()
    }

    pub fn leaves_source(&self, arc_idx: u32) -> bool {
        self.arcs[arc_idx as usize].from == SOURCE_IDX
    }

    /// Converts positions along a path in a sub-network into the visited nodes.
    pub fn path_nodes(&self, sub: &SubNetwork, path: &[u32]) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(path.len() + 1);
        for (i, pos) in path.iter().enumerate() {
            let arc = &self.arcs[sub.arcs[*pos as usize] as usize];
            if i == 0 {
                out.push(self.nodes[arc.from as usize]);
            }
            out.push(self.nodes[arc.to as usize]);
        }
        out
    }
}

fn block_subnetworks(blocks: &[u32], nodes: &[NodeId], arcs: &[Arc]) -> Vec<SubNetwork> {
    let block_pos: HashMap<u32, usize> = blocks.iter().enumerate().map(|(i, u)| (*u, i)).collect();

    let mut block_nodes: Vec<Vec<u32>> = blocks.iter().map(|_| vec![SOURCE_IDX, SINK_IDX]).collect();
    for (idx, node) in nodes.iter().enumerate().skip(2) {
        if let Some(b) = block_pos.get(&node.vehicle()) {
            block_nodes[*b].push(idx as u32);
        }
    }

    let mut block_arcs: Vec<Vec<u32>> = blocks.iter().map(|_| Vec::new()).collect();
    for (idx, arc) in arcs.iter().enumerate() {
        let owners: HashSet<u32> = [arc.key.from, arc.key.to]
            .iter()
            .filter(|n| !n.is_sentinel())
            .map(|n| n.vehicle())
            .collect();
        match owners.len() {
            // Depot to depot: available to every block.
            0 => block_arcs.iter_mut().for_each(|a| a.push(idx as u32)),
            1 => {
                if let Some(b) = owners.iter().next().and_then(|v| block_pos.get(v)) {
                    block_arcs[*b].push(idx as u32);
                }
            }
            // Deadhead between two blocks: only backups may use it.
            _ => {}
        }
    }

    block_nodes
        .into_iter()
        .zip(block_arcs)
        .map(|(n, a)| SubNetwork::new(n, a, arcs))
        .collect()
}
