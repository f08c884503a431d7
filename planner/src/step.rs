use crate::error::LagrangeError;

/// Step size schedule for the multiplier updates. Iterations count from 1.
pub trait StepSizeRule: Send + Sync + std::fmt::Debug {
    fn step_size(&self, iteration: usize) -> f64;
    fn name(&self) -> &str;
}

/// `θ_k = c / k`.
#[derive(Debug, Clone, Copy)]
pub struct Diminishing {
    pub constant: f64,
}

impl StepSizeRule for Diminishing {
    fn step_size(&self, iteration: usize) -> f64 {
        self.constant / iteration as f64
    }

    fn name(&self) -> &str {
        "diminishing"
    }
}

/// Looks up a rule by the name used in configuration files.
pub fn step_rule(method: &str, constant: f64) -> Result<Box<dyn StepSizeRule>, LagrangeError> {
    if !constant.is_finite() || constant <= 0.0 {
        return Err(LagrangeError::InvalidStepConstant(constant));
    }
    match method {
        "basic" | "diminishing" => Ok(Box::new(Diminishing { constant })),
        other => Err(LagrangeError::UnknownStepMethod(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diminishing_steps() {
        let rule = step_rule("basic", 0.5).unwrap();
        assert_eq!(rule.step_size(1), 0.5);
        assert_eq!(rule.step_size(4), 0.125);
        assert_eq!(rule.name(), "diminishing");
    }

    #[test]
    fn unknown_method_and_bad_constant() {
        assert!(matches!(step_rule("newton", 1e-4), Err(LagrangeError::UnknownStepMethod(m)) if m == "newton"));
        assert!(matches!(step_rule("basic", 0.0), Err(LagrangeError::InvalidStepConstant(_))));
        assert!(matches!(step_rule("basic", f64::NAN), Err(LagrangeError::InvalidStepConstant(_))));
    }
}
