use log::debug;
use ordered_float::OrderedFloat;

use crate::{network::Network, primal::Primal};

/// Lagrange multipliers. `mu` is indexed by global node, `lambda_block` and
/// `lambda_backup` by position in the network's block and backup lists.
/// Both lambda families are never negative. Only `zeros` and `next` produce
/// a state.
#[derive(Debug, Clone, PartialEq)]
pub struct DualState {
    mu: Vec<f64>,
    lambda_block: Vec<f64>,
    lambda_backup: Vec<f64>,
}

impl DualState {
    pub fn zeros(network: &Network) -> Self {
        DualState {
            mu: vec![0.0; network.n_nodes()],
            lambda_block: vec![0.0; network.blocks.len()],
            lambda_backup: vec![0.0; network.backups.len()],
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(mu: Vec<f64>, lambda_block: Vec<f64>, lambda_backup: Vec<f64>) -> Self {
        DualState { mu, lambda_block, lambda_backup }
    }

    pub fn mu(&self) -> &[f64] {
        &self.mu
    }

    pub fn lambda_block(&self) -> &[f64] {
        &self.lambda_block
    }

    pub fn lambda_backup(&self) -> &[f64] {
        &self.lambda_backup
    }

    /// One subgradient step from the given primal assignment. Returns a new
    /// snapshot; `self` is left as it was.
    pub fn next(&self, network: &Network, primal: &Primal, theta: f64) -> DualState {
        DualState {
            mu: update_mu(network, &self.mu, primal, theta),
            lambda_block: update_lambda_block(network, &self.lambda_block, primal, theta),
            lambda_backup: update_lambda_backup(network, &self.lambda_backup, primal, theta),
        }
    }
}

/// Number of used arcs leaving each node. Block arcs only count when the
/// destination carries the same vehicle id as the origin.
pub fn coverage(network: &Network, primal: &Primal) -> Vec<f64> {
    let mut out = vec![0.0; network.n_nodes()];
    for (sub, x) in network.block_networks.iter().zip(primal.x.iter()) {
        for (a, _) in sub.arcs.iter().zip(x.iter()).filter(|(_, x)| **x) {
            if network.counts_for_block_coverage(*a) {
                out[network.arcs[*a as usize].from as usize] += 1.0;
            }
        }
    }
    for z in primal.z.iter() {
        for (arc, _) in network.arcs.iter().zip(z.iter()).filter(|(_, z)| **z) {
            out[arc.from as usize] += 1.0;
        }
    }
    out
}

pub fn update_mu(network: &Network, mu: &[f64], primal: &Primal, theta: f64) -> Vec<f64> {
    let actual = coverage(network, primal);
    let violation = (0..network.n_nodes() as u32)
        .map(|n| actual[n as usize] - network.required_coverage(n))
        .collect::<Vec<_>>();

    if log::log_enabled!(log::Level::Debug) {
        if let Some((n, g)) = violation.iter().enumerate().max_by_key(|(_, g)| OrderedFloat(g.abs())) {
            debug!("largest coverage violation {:+} at node {}", g, network.nodes[n]);
        }
    }

    mu.iter().zip(violation).map(|(m, g)| m + theta * g).collect()
}

pub fn update_lambda_block(network: &Network, lambda: &[f64], primal: &Primal, theta: f64) -> Vec<f64> {
    lambda
        .iter()
        .enumerate()
        .map(|(u, l)| project(*l, theta, primal.block_energy(network, u) - network.orig_kwh[u]))
        .collect()
}

pub fn update_lambda_backup(network: &Network, lambda: &[f64], primal: &Primal, theta: f64) -> Vec<f64> {
    lambda
        .iter()
        .enumerate()
        .map(|(b, l)| project(*l, theta, primal.backup_energy(network, b) - network.bu_kwh[b]))
        .collect()
}

/// Subgradient step projected onto the nonnegative half-line.
pub fn project(lambda: f64, theta: f64, subgradient: f64) -> f64 {
    (lambda + theta * subgradient).max(0.0)
}
