use std::collections::VecDeque;

use log::trace;

use crate::{
    error::LagrangeError,
    network::{SubNetwork, SINK_IDX, SOURCE_IDX},
    VehicleSolution,
};

#[derive(Debug, Clone, Copy)]
struct Label {
    cost: f64,
    prev_arc: u32,
    n_queued: u32,
}

const NO_ARC: u32 = u32::MAX;

/// Cheapest source-to-sink path through one vehicle's sub-network.
///
/// Reduced costs are routinely negative, so this is a label-correcting
/// search (FIFO Bellman-Ford) rather than Dijkstra. The network is not
/// assumed acyclic; a negative cycle reachable from the source is reported
/// as an error instead of looping.
pub fn plan_vehicle(vehicle: u32, sub: &SubNetwork, costs: &[f64]) -> Result<VehicleSolution, LagrangeError> {
    assert!(costs.len() == sub.arcs.len());
    let n_nodes = sub.n_nodes();

    let mut labels = vec![
        Label {
            cost: f64::INFINITY,
            prev_arc: NO_ARC,
            n_queued: 0,
        };
        n_nodes
    ];
    let mut in_queue = vec![false; n_nodes];
    let mut queue: VecDeque<u32> = VecDeque::new();

    labels[SOURCE_IDX as usize].cost = 0.0;
    labels[SOURCE_IDX as usize].n_queued = 1;
    queue.push_back(SOURCE_IDX);
    in_queue[SOURCE_IDX as usize] = true;

    let mut n_ops = 0usize;
    while let Some(node) = queue.pop_front() {
        in_queue[node as usize] = false;
        let cost = labels[node as usize].cost;

        for (target, pos) in sub.outgoing[node as usize].iter() {
            n_ops += 1;
            let new_cost = cost + costs[*pos as usize];
            let label = &mut labels[*target as usize];
            if new_cost < label.cost {
                label.cost = new_cost;
                label.prev_arc = *pos;
                if !in_queue[*target as usize] {
                    // Without negative cycles a node is queued at most once
                    // per pass, and there are fewer passes than nodes.
                    label.n_queued += 1;
                    if label.n_queued as usize >= n_nodes {
                        return Err(LagrangeError::NegativeCycle { vehicle });
                    }
                    in_queue[*target as usize] = true;
                    queue.push_back(*target);
                }
            }
        }
    }

    let sink = &labels[SINK_IDX as usize];
    if sink.prev_arc == NO_ARC {
        return Err(LagrangeError::NoPath { vehicle });
    }

    let mut path = Vec::new();
    let mut node = SINK_IDX;
    while node != SOURCE_IDX {
        let pos = labels[node as usize].prev_arc;
        path.push(pos);
        node = sub.ends[pos as usize].0;
        if path.len() > n_nodes {
            return Err(LagrangeError::NegativeCycle { vehicle });
        }
    }
    path.reverse();

    trace!("solved vehicle {} cost {:.4} with {} ops, path {:?}", vehicle, sink.cost, n_ops, path);

    Ok(VehicleSolution { cost: sink.cost, path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use bebsched_structs::{
        problem::{ArcEntry, Problem},
        NodeId, SINK, SOURCE,
    };
    use std::collections::BTreeMap;

    fn network(arcs: Vec<(NodeId, NodeId)>, trips: Vec<NodeId>) -> Network {
        Network::new(&Problem {
            trips,
            blocks: vec![],
            backups: vec![1],
            arcs: arcs.into_iter().map(|(from, to)| ArcEntry { from, to, kwh: 1.0 }).collect(),
            orig_kwh: BTreeMap::new(),
            bu_kwh: BTreeMap::from([(1, 10.0)]),
            x_init: None,
            z_init: None,
            upper_bound: None,
        })
        .unwrap()
    }

    #[test]
    fn negative_costs_pick_the_long_way() {
        let (a, b) = (NodeId(2, 1), NodeId(2, 2));
        let net = network(
            vec![(SOURCE, a), (a, b), (b, SINK), (SOURCE, SINK), (a, SINK)],
            vec![a, b],
        );
        // Arcs in input order: s->a, a->b, b->t, s->t, a->t
        let costs = [1.0, -5.0, 0.5, 0.0, 0.0];
        let sol = plan_vehicle(1, &net.full, &costs).unwrap();
        assert_eq!(sol.path, vec![0, 1, 2]);
        assert_eq!(sol.cost, -3.5);
        assert_eq!(net.path_nodes(&net.full, &sol.path), vec![SOURCE, a, b, SINK]);

        let costs = [1.0, 5.0, 0.5, 0.0, 0.0];
        let sol = plan_vehicle(1, &net.full, &costs).unwrap();
        assert_eq!(sol.path, vec![3]);
    }

    #[test]
    fn cycles_with_nonnegative_total_are_fine() {
        let (a, b) = (NodeId(2, 1), NodeId(2, 2));
        let net = network(vec![(SOURCE, a), (a, b), (b, a), (b, SINK)], vec![a, b]);
        let costs = [0.0, -2.0, 3.0, 1.0];
        let sol = plan_vehicle(1, &net.full, &costs).unwrap();
        assert_eq!(sol.path, vec![0, 1, 3]);
        assert_eq!(sol.cost, -1.0);
    }

    #[test]
    fn unreachable_sink_is_an_error() {
        let a = NodeId(2, 1);
        let net = network(vec![(SOURCE, a)], vec![a]);
        assert!(matches!(
            plan_vehicle(4, &net.full, &[0.0]),
            Err(LagrangeError::NoPath { vehicle: 4 })
        ));
    }

    #[test]
    fn wide_fan_in_without_cycles_is_solved() {
        // s -> c -> a_i -> t -> sink, plus direct arcs from s to every a_i
        // and to t. Node t is improved once per a_i.
        let t = NodeId(3, 1);
        let a: Vec<NodeId> = (1..=5).map(|i| NodeId(3, 1 + i)).collect();
        let c = NodeId(3, 9);

        let mut arcs = vec![(SOURCE, t)];
        arcs.extend(a.iter().map(|ai| (SOURCE, *ai)));
        arcs.push((SOURCE, c));
        arcs.extend(a.iter().map(|ai| (c, *ai)));
        arcs.extend(a.iter().map(|ai| (*ai, t)));
        arcs.push((t, SINK));

        let mut costs = vec![0.0; 7];
        costs.extend([-10.0; 5]);
        costs.extend((1..=5).map(|i| -(i as f64)));
        costs.push(0.0);

        let mut trips = vec![t, c];
        trips.extend(a.iter());
        let net = network(arcs, trips);
        assert_eq!(net.full.n_nodes(), 9);

        let sol = plan_vehicle(1, &net.full, &costs).unwrap();
        assert_eq!(sol.cost, -15.0);
        assert_eq!(net.path_nodes(&net.full, &sol.path), vec![SOURCE, c, a[4], t, SINK]);
    }

    #[test]
    fn negative_cycle_is_detected() {
        let (a, b) = (NodeId(2, 1), NodeId(2, 2));
        let net = network(vec![(SOURCE, a), (a, b), (b, a), (b, SINK)], vec![a, b]);
        let costs = [0.0, -2.0, 1.0, 0.0];
        assert!(matches!(
            plan_vehicle(1, &net.full, &costs),
            Err(LagrangeError::NegativeCycle { vehicle: 1 })
        ));
    }
}
