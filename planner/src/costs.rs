use crate::{duals::DualState, network::Network};

/// Arc costs for backup `b`, parallel to the full arc list. Leaving the
/// source costs one unit so that backups stay idle unless they pay off.
pub fn backup_costs(network: &Network, duals: &DualState, b: usize) -> Vec<f64> {
    let lambda = duals.lambda_backup()[b];
    network
        .full
        .arcs
        .iter()
        .map(|a| {
            let arc = &network.arcs[*a as usize];
            let depot = if network.leaves_source(*a) { 1.0 } else { 0.0 };
            depot + duals.mu()[arc.from as usize] + arc.kwh * lambda
        })
        .collect()
}

/// Arc costs for block `u`, parallel to the arcs of its sub-network.
pub fn block_costs(network: &Network, duals: &DualState, u: usize) -> Vec<f64> {
    let lambda = duals.lambda_block()[u];
    network.block_networks[u]
        .arcs
        .iter()
        .map(|a| {
            let arc = &network.arcs[*a as usize];
            duals.mu()[arc.from as usize] + arc.kwh * lambda
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bebsched_structs::{
        problem::{ArcEntry, Problem},
        ArcKey, NodeId, SINK, SOURCE,
    };
    use std::collections::BTreeMap;

    fn network() -> Network {
        let arc = |from, to, kwh| ArcEntry { from, to, kwh };
        Network::new(&Problem {
            trips: vec![NodeId(1, 1), NodeId(2, 1)],
            blocks: vec![1, 2],
            backups: vec![7],
            arcs: vec![
                arc(SOURCE, NodeId(1, 1), 2.0),
                arc(NodeId(1, 1), SINK, 3.0),
                arc(SOURCE, NodeId(2, 1), 1.0),
                arc(NodeId(2, 1), SINK, 1.0),
                arc(NodeId(1, 1), NodeId(2, 1), 4.0),
            ],
            orig_kwh: BTreeMap::from([(1, 5.0), (2, 5.0)]),
            bu_kwh: BTreeMap::from([(7, 5.0)]),
            x_init: None,
            z_init: None,
            upper_bound: None,
        })
        .unwrap()
    }

    fn duals(network: &Network) -> DualState {
        assert_eq!(network.n_nodes(), 4);
        DualState::from_parts(vec![-1.5, 0.0, 0.25, -0.75], vec![0.5, 0.0], vec![2.0])
    }

    #[test]
    fn backup_costs_charge_depot_departures() {
        let network = network();
        let costs = backup_costs(&network, &duals(&network), 0);
        let at = |from, to| costs[network.arc_idx(&ArcKey::new(from, to)).unwrap() as usize];
        assert_eq!(at(SOURCE, NodeId(1, 1)), 1.0 - 1.5 + 2.0 * 2.0);
        assert_eq!(at(NodeId(1, 1), SINK), 0.25 + 3.0 * 2.0);
        assert_eq!(at(NodeId(1, 1), NodeId(2, 1)), 0.25 + 4.0 * 2.0);
    }

    #[test]
    fn block_costs_cover_only_own_arcs() {
        let network = network();
        let costs = block_costs(&network, &duals(&network), 0);
        assert_eq!(costs, vec![-1.5 + 2.0 * 0.5, 0.25 + 3.0 * 0.5]);
        let costs = block_costs(&network, &duals(&network), 1);
        assert_eq!(costs, vec![-1.5, -0.75]);
    }

    #[test]
    fn rebuilding_gives_identical_costs() {
        let network = network();
        let d = duals(&network);
        for u in 0..network.blocks.len() {
            assert_eq!(block_costs(&network, &d, u), block_costs(&network, &d, u));
        }
        assert_eq!(backup_costs(&network, &d, 0), backup_costs(&network, &d, 0));
    }
}
