use crate::backend::{BetaDistribution, DefaultBeta};
use crate::error::{validate_sample, ValidationError};
use std::fmt;

/// Uniform + Beta(r, s) mixture of p-values
///
/// * `lambda0` - proportion of p-values drawn from the uniform (null) component
/// * `r`, `s` - shape parameters of the beta (non-null) component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureModel {
    lambda0: f64,
    r: f64,
    s: f64,
}

impl MixtureModel {
    /// Checked constructor: `0 <= lambda0 <= 1`, `r > 0`, `s > 0`
    pub fn new(lambda0: f64, r: f64, s: f64) -> Result<Self, ValidationError> {
        if !lambda0.is_finite() || !(0.0..=1.0).contains(&lambda0) {
            return Err(ValidationError::Parameter {
                name: "lambda0",
                value: lambda0,
            });
        }
        if !r.is_finite() || r <= 0.0 {
            return Err(ValidationError::Parameter {
                name: "r",
                value: r,
            });
        }
        if !s.is_finite() || s <= 0.0 {
            return Err(ValidationError::Parameter {
                name: "s",
                value: s,
            });
        }
        Ok(Self { lambda0, r, s })
    }

    /// No validation. Only the optimizer objective may build these, as
    /// the simplex probes points slightly outside the feasible set.
    pub(crate) fn unchecked(lambda0: f64, r: f64, s: f64) -> Self {
        Self { lambda0, r, s }
    }

    pub fn lambda0(&self) -> f64 {
        self.lambda0
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn s(&self) -> f64 {
        self.s
    }

    /// `[lambda0, r, s]`
    pub fn to_array(&self) -> [f64; 3] {
        [self.lambda0, self.r, self.s]
    }

    /// Mixture distribution function `lambda0 * x + (1 - lambda0) * F_beta(x)`
    pub fn cdf(&self, x: f64) -> f64 {
        self.cdf_with(&DefaultBeta, x)
    }

    pub fn cdf_with<B: BetaDistribution>(&self, beta: &B, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        self.lambda0 * x + (1.0 - self.lambda0) * beta.cdf(x, self.r, self.s)
    }
}

impl fmt::Display for MixtureModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lambda0 = {}, r = {}, s = {}",
            self.lambda0, self.r, self.s
        )
    }
}

/// A fitted mixture model together with the p-values it was fitted to.
///
/// The sample is copied on construction and only lent out as a slice.
#[derive(Debug, Clone)]
pub struct ModelEstimate {
    model: MixtureModel,
    sample: Vec<f64>,
    configuration: Box<str>,
    log_likelihood: f64,
    iterations: u64,
}

impl ModelEstimate {
    /// Wrap known parameters, e.g., published estimates, for bootstrapping.
    pub fn new(model: MixtureModel, sample: &[f64]) -> Result<Self, ValidationError> {
        validate_sample(sample)?;
        Ok(Self {
            model,
            sample: sample.to_vec(),
            configuration: "user".into(),
            log_likelihood: f64::NAN,
            iterations: 0,
        })
    }

    pub(crate) fn fitted(
        model: MixtureModel,
        sample: Vec<f64>,
        configuration: &str,
        log_likelihood: f64,
        iterations: u64,
    ) -> Self {
        Self {
            model,
            sample,
            configuration: configuration.into(),
            log_likelihood,
            iterations,
        }
    }

    pub fn model(&self) -> &MixtureModel {
        &self.model
    }

    pub fn lambda0(&self) -> f64 {
        self.model.lambda0()
    }

    pub fn r(&self) -> f64 {
        self.model.r()
    }

    pub fn s(&self) -> f64 {
        self.model.s()
    }

    pub fn sample(&self) -> &[f64] {
        &self.sample
    }

    pub fn num_p_values(&self) -> usize {
        self.sample.len()
    }

    /// Name of the optimizer configuration, or `user` for supplied values
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Maximized log-likelihood (NaN when not fitted here)
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

impl fmt::Display for ModelEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "lambda0 = {}", self.model.lambda0)?;
        writeln!(f, "r = {}, s = {}", self.model.r, self.model.s)?;
        writeln!(f, "configuration = {}", self.configuration)?;
        write!(f, "sample size = {}", self.sample.len())
    }
}
