use serde::{Deserialize, Serialize};

/// Subgradient run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubgradientConfig {
    /// Iteration cap. Reaching it is a normal outcome.
    pub max_iterations: usize,

    /// Step size rule name; `"basic"` (or `"diminishing"`) is `c / k`.
    pub step_method: String,

    /// The constant `c` of the step size rule.
    pub step_constant: f64,

    /// Solve the per-vehicle subproblems on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SubgradientConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            step_method: "basic".to_string(),
            step_constant: 1e-4,
            parallel: true,
        }
    }
}
