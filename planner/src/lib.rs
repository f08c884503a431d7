pub mod config;
pub mod costs;
pub mod duals;
pub mod error;
pub mod io;
pub mod network;
pub mod primal;
pub mod shortest_path;
pub mod step;
pub mod subgradient;


use bebsched_structs::problem::Problem;

pub use config::SubgradientConfig;
pub use error::LagrangeError;
pub use subgradient::{SolverStatus, SubgradientReport, SubgradientSolver};

#[derive(Debug, Clone)]
pub struct VehicleSolution {
    pub cost: f64,
    /// Positions in the sub-network's arc list, from source to sink.
    pub path: Vec<u32>,
}

/// Lagrangian lower bound for the backup scheduling problem.
pub fn solve(problem: &Problem, config: &SubgradientConfig) -> Result<SubgradientReport, LagrangeError> {
    SubgradientSolver::new(problem, config)?.run()
}
