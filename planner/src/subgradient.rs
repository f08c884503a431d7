use std::time::{Duration, Instant};

use bebsched_structs::{plan::Schedule, problem::Problem};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    config::SubgradientConfig,
    costs::{backup_costs, block_costs},
    duals::DualState,
    error::LagrangeError,
    network::Network,
    primal::{self, check_schedule, Primal, ScheduleCheck},
    shortest_path::plan_vehicle,
    step::{step_rule, StepSizeRule},
};

/// Slack allowed when rounding a dual value up to an integer bound.
pub const INTEGRALITY_TOL: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolverStatus {
    Initialized,
    Iterating,
    /// The rounded bound met the upper bound: the known solution is optimal.
    Converged,
    /// Iteration cap reached. The bound is valid but not certified tight.
    Exhausted,
}

impl SolverStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, SolverStatus::Converged | SolverStatus::Exhausted)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubgradientReport {
    pub status: SolverStatus,
    pub best_bound: f64,
    pub best_integer_bound: f64,
    pub best_iteration: usize,
    pub iterations: usize,
    /// Dual value of every iteration, in order. Not monotone.
    pub bound_history: Vec<f64>,
    /// Vehicle paths of the best iteration.
    pub schedule: Schedule,
    /// How far `schedule` is from being operable.
    pub schedule_check: ScheduleCheck,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct IterationOutcome {
    pub iteration: usize,
    pub theta: f64,
    pub value: f64,
    pub best_bound: f64,
    pub improved: bool,
}

/// Smallest integer the optimal objective can take given a dual value.
pub fn integer_bound(value: f64) -> f64 {
    (value - INTEGRALITY_TOL).ceil()
}

pub struct SubgradientSolver {
    network: Network,
    upper_bound: Option<f64>,
    max_iterations: usize,
    parallel: bool,
    step_rule: Box<dyn StepSizeRule>,
    status: SolverStatus,
    iteration: usize,
    duals: DualState,
    primal: Primal,
    best_bound: f64,
    best_iteration: usize,
    best_block_paths: Vec<Vec<u32>>,
    best_backup_paths: Vec<Vec<u32>>,
    bound_history: Vec<f64>,
}

impl SubgradientSolver {
    pub fn new(problem: &Problem, config: &SubgradientConfig) -> Result<Self, LagrangeError> {
        let step_rule = step_rule(&config.step_method, config.step_constant)?;
        let network = Network::new(problem)?;
        let primal = Primal::warm_start(&network, problem.x_init.as_deref(), problem.z_init.as_deref())?;
        let duals = DualState::zeros(&network);
        debug!(
            "Subgradient solver with {} steps (c = {:e}), at most {} iterations, upper bound {:?}",
            step_rule.name(),
            config.step_constant,
            config.max_iterations,
            problem.upper_bound
        );

        Ok(SubgradientSolver {
            network,
            upper_bound: problem.upper_bound,
            max_iterations: config.max_iterations,
            parallel: config.parallel,
            step_rule,
            status: SolverStatus::Initialized,
            iteration: 0,
            duals,
            primal,
            best_bound: f64::NEG_INFINITY,
            best_iteration: 0,
            best_block_paths: Vec::new(),
            best_backup_paths: Vec::new(),
            bound_history: Vec::new(),
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn status(&self) -> SolverStatus {
        self.status
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn duals(&self) -> &DualState {
        &self.duals
    }

    pub fn primal(&self) -> &Primal {
        &self.primal
    }

    pub fn best_bound(&self) -> f64 {
        self.best_bound
    }

    /// One subgradient iteration: move the multipliers using the previous
    /// primal, re-solve every vehicle, evaluate the dual function. Fails with
    /// `Finished` once the run has converged or hit the cap.
    pub fn step(&mut self) -> Result<IterationOutcome, LagrangeError> {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("subgradient iteration");
        if self.status.is_finished() {
            return Err(LagrangeError::Finished { iterations: self.iteration });
        }
        self.status = SolverStatus::Iterating;
        self.iteration += 1;
        let k = self.iteration;
        let theta = self.step_rule.step_size(k);

        let duals = {
            #[cfg(feature = "prof")]
            let _p = hprof::enter("update duals");
            self.duals.next(&self.network, &self.primal, theta)
        };

        let (block_paths, backup_paths) = {
            #[cfg(feature = "prof")]
            let _p = hprof::enter("subproblems");
            solve_subproblems(&self.network, &duals, self.parallel)?
        };

        let primal = Primal::from_paths(&self.network, &block_paths, &backup_paths);
        let value = lagrangian_value(&self.network, &duals, &primal);
        self.duals = duals;
        self.primal = primal;
        self.bound_history.push(value);

        let improved = value > self.best_bound;
        if improved {
            self.best_bound = value;
            self.best_iteration = k;
            self.best_block_paths = block_paths;
            self.best_backup_paths = backup_paths;
            info!(
                "Iteration {}: new best dual bound {:.4}, best integer bound {}",
                k,
                value,
                integer_bound(value)
            );
        }
        debug!("Iteration {}: theta {:.3e} dual value {:.4} best {:.4}", k, theta, value, self.best_bound);

        if self.upper_bound.is_some_and(|ub| integer_bound(self.best_bound) == ub) {
            info!("Lagrangian bound equals the provided upper bound, solution is optimal");
            self.status = SolverStatus::Converged;
        } else if k >= self.max_iterations {
            self.status = SolverStatus::Exhausted;
        }

        Ok(IterationOutcome {
            iteration: k,
            theta,
            value,
            best_bound: self.best_bound,
            improved,
        })
    }

    pub fn run(mut self) -> Result<SubgradientReport, LagrangeError> {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("subgradient");
        let t0 = Instant::now();
        if self.max_iterations == 0 {
            self.status = SolverStatus::Exhausted;
        }
        while !self.status.is_finished() {
            self.step()?;
        }
        let duration = t0.elapsed();
        info!("Subgradient optimization completed in {:.2} seconds", duration.as_secs_f64());
        Ok(self.report(duration))
    }

    fn report(&self, duration: Duration) -> SubgradientReport {
        let schedule = primal::schedule(&self.network, &self.best_block_paths, &self.best_backup_paths);
        SubgradientReport {
            status: self.status,
            best_bound: self.best_bound,
            best_integer_bound: integer_bound(self.best_bound),
            best_iteration: self.best_iteration,
            iterations: self.iteration,
            bound_history: self.bound_history.clone(),
            schedule_check: check_schedule(&self.network, &schedule),
            schedule,
            duration,
        }
    }
}

/// Shortest path of every block and every backup under the given prices.
/// Each solve reads only its own sub-network and costs.
fn solve_subproblems(
    network: &Network,
    duals: &DualState,
    parallel: bool,
) -> Result<(Vec<Vec<u32>>, Vec<Vec<u32>>), LagrangeError> {
    let solve_block = |u: usize| {
        let costs = block_costs(network, duals, u);
        plan_vehicle(network.blocks[u], &network.block_networks[u], &costs).map(|s| s.path)
    };
    let solve_backup = |b: usize| {
        let costs = backup_costs(network, duals, b);
        plan_vehicle(network.backups[b], &network.full, &costs).map(|s| s.path)
    };

    if parallel {
        let blocks = (0..network.blocks.len())
            .into_par_iter()
            .map(solve_block)
            .collect::<Result<Vec<_>, _>>()?;
        let backups = (0..network.backups.len())
            .into_par_iter()
            .map(solve_backup)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((blocks, backups))
    } else {
        let blocks = (0..network.blocks.len()).map(solve_block).collect::<Result<Vec<_>, _>>()?;
        let backups = (0..network.backups.len()).map(solve_backup).collect::<Result<Vec<_>, _>>()?;
        Ok((blocks, backups))
    }
}

/// Value of the Lagrangian dual function at `duals` for the given paths.
pub fn lagrangian_value(network: &Network, duals: &DualState, primal: &Primal) -> f64 {
    let x_obj: f64 = network
        .block_networks
        .iter()
        .zip(primal.x.iter())
        .enumerate()
        .map(|(u, (sub, x))| {
            sub.arcs
                .iter()
                .zip(x.iter())
                .filter(|(_, x)| **x)
                .map(|(a, _)| {
                    let arc = &network.arcs[*a as usize];
                    duals.mu()[arc.from as usize] + duals.lambda_block()[u] * arc.kwh
                })
                .sum::<f64>()
        })
        .sum();

    let z_obj: f64 = primal
        .z
        .iter()
        .enumerate()
        .map(|(b, z)| {
            network
                .arcs
                .iter()
                .enumerate()
                .zip(z.iter())
                .filter(|(_, z)| **z)
                .map(|((a, arc), _)| {
                    let depot = if network.leaves_source(a as u32) { 1.0 } else { 0.0 };
                    depot + duals.mu()[arc.from as usize] + duals.lambda_backup()[b] * arc.kwh
                })
                .sum::<f64>()
        })
        .sum();

    let constant = duals.mu().iter().sum::<f64>()
        + duals
            .lambda_block()
            .iter()
            .zip(network.orig_kwh.iter())
            .map(|(l, e)| l * e)
            .sum::<f64>()
        + duals
            .lambda_backup()
            .iter()
            .zip(network.bu_kwh.iter())
            .map(|(l, e)| l * e)
            .sum::<f64>();

    x_obj + z_obj - constant
}
