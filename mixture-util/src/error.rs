use crate::config::OptimizerConfiguration;
use thiserror::Error;

/// Bad input detected before any computation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("empty sample of p-values")]
    EmptySample,

    #[error("p-value #{index} is NaN")]
    NotANumber { index: usize },

    #[error("p-value #{index} = {value} is outside [0, 1]")]
    OutOfRange { index: usize, value: f64 },

    #[error("invalid model parameter {name} = {value}")]
    Parameter { name: &'static str, value: f64 },

    #[error("invalid argument {name} = {value}: {reason}")]
    Argument {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Failure modes of the mixture model estimator.
///
/// `NotConverged` is routine for samples with little or no signal; callers
/// may retry with another [`OptimizerConfiguration`] using
/// [`EstimationError::sample`].
#[derive(Debug, Clone, Error)]
pub enum EstimationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "optimizer did not converge with the {} configuration after {iterations} iterations ({reason}, {} p-values)",
        .configuration.name(),
        .sample.len()
    )]
    NotConverged {
        configuration: OptimizerConfiguration,
        sample: Vec<f64>,
        iterations: u64,
        reason: String,
    },

    #[error("optimizer returned parameters outside the valid range: lambda0 = {lambda0}, r = {r}, s = {s}")]
    InvariantViolation { lambda0: f64, r: f64, s: f64 },

    #[error("optimizer backend failure: {0}")]
    Backend(String),
}

impl EstimationError {
    /// The p-values carried by a convergence failure
    pub fn sample(&self) -> Option<&[f64]> {
        match self {
            EstimationError::NotConverged { sample, .. } => Some(sample),
            _ => None,
        }
    }

    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, EstimationError::NotConverged { .. })
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, EstimationError::Validation(_))
    }
}

/// Check that every p-value is a number in [0, 1].
pub fn validate_sample(sample: &[f64]) -> Result<(), ValidationError> {
    if sample.is_empty() {
        return Err(ValidationError::EmptySample);
    }
    for (index, &value) in sample.iter().enumerate() {
        if value.is_nan() {
            return Err(ValidationError::NotANumber { index });
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::OutOfRange { index, value });
        }
    }
    Ok(())
}
