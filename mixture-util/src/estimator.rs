//! Maximum likelihood fit of the uniform + beta mixture.
//!
//! The grid-search starting point seeds a Nelder-Mead simplex (`argmin`).
//! Bounds are enforced with an additive penalty on the violation, so the
//! simplex may step outside the feasible set but its best vertex cannot
//! stay there.

use crate::backend::DefaultBeta;
use crate::config::{OptimizerConfiguration, StartingPoint};
use crate::density::{log_likelihood, BetaMixtureDensity, ProbabilityDensityFunction};
use crate::error::{validate_sample, EstimationError};
use crate::model::{MixtureModel, ModelEstimate};

use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use log::{debug, info};

/// Cost added per unit of bound violation
pub const PENALTY_WEIGHT: f64 = 1e30;

/// Relative offset of the initial simplex vertices
const SIMPLEX_STEP: f64 = 0.1;

/// Negative log-likelihood over the box given by the configuration
struct PenalizedObjective<'a, F: ProbabilityDensityFunction + ?Sized> {
    pdf: &'a F,
    sample: &'a [f64],
    lower: [f64; 3],
    upper: [f64; 3],
    scale: f64,
}

impl<F: ProbabilityDensityFunction + ?Sized> PenalizedObjective<'_, F> {
    fn violation(&self, param: &[f64]) -> f64 {
        param
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .map(|(&x, (&lb, &ub))| (lb - x).max(0.0) + (x - ub).max(0.0))
            .sum()
    }
}

impl<F: ProbabilityDensityFunction + ?Sized> CostFunction for PenalizedObjective<'_, F> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        if param.len() != 3 || param.iter().any(|x| x.is_nan()) {
            return Ok(f64::INFINITY);
        }

        let violation = self.violation(param);
        let model = MixtureModel::unchecked(param[0], param[1], param[2]);

        match log_likelihood(&model, self.pdf, self.sample) {
            Ok(llik) if !llik.is_finite() => Ok(f64::INFINITY),
            Ok(llik) => Ok(-llik / self.scale + PENALTY_WEIGHT * violation),
            // outside even the lenient domain
            Err(_) => Ok(PENALTY_WEIGHT * (1.0 + violation)),
        }
    }
}

/// Constrained maximum likelihood estimator of `(lambda0, r, s)`
pub struct MixtureModelEstimator<F: ProbabilityDensityFunction = BetaMixtureDensity> {
    config: OptimizerConfiguration,
    pdf: F,
}

impl MixtureModelEstimator<BetaMixtureDensity> {
    pub fn new(config: OptimizerConfiguration) -> Self {
        Self {
            config,
            pdf: BetaMixtureDensity::new(DefaultBeta),
        }
    }
}

impl Default for MixtureModelEstimator<BetaMixtureDensity> {
    fn default() -> Self {
        Self::new(OptimizerConfiguration::standard())
    }
}

impl<F: ProbabilityDensityFunction> MixtureModelEstimator<F> {
    pub fn with_density(config: OptimizerConfiguration, pdf: F) -> Self {
        Self { config, pdf }
    }

    pub fn configuration(&self) -> &OptimizerConfiguration {
        &self.config
    }

    /// Fit the mixture model to a sample of p-values.
    ///
    /// * `sample` - p-values in [0, 1]; copied, never modified
    ///
    /// Invalid samples fail with [`EstimationError::Validation`] before any
    /// optimization. A simplex that does not settle within the configured
    /// iterations fails with [`EstimationError::NotConverged`], which hands
    /// the sample back for a retry with another configuration.
    pub fn estimate(&self, sample: &[f64]) -> Result<ModelEstimate, EstimationError> {
        validate_sample(sample)?;
        let sample = sample.to_vec();

        let start = self.config.find_starting_point(&self.pdf, &sample)?;
        let start_model = MixtureModel::new(start.lambda0, start.r, start.s)?;
        let start_llik = log_likelihood(&start_model, &self.pdf, &sample)?;

        debug!(
            "[{}] starting point: {} (log-likelihood {})",
            self.config.name(),
            start,
            start_llik
        );

        let scale = if start_llik.is_finite() {
            start_llik.abs().max(1.0)
        } else {
            1.0
        };

        let simplex = self.initial_simplex(&start);
        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(self.config.tolerance())
            .map_err(|e| EstimationError::Backend(e.to_string()))?;
        let max_iters = self.config.max_iters();

        let (status, iterations, best) = {
            let objective = PenalizedObjective {
                pdf: &self.pdf,
                sample: &sample,
                lower: self.config.lower_bounds().to_array(),
                upper: self.config.upper_bounds().to_array(),
                scale,
            };
            let result = Executor::new(objective, solver)
                .configure(|state| state.max_iters(max_iters))
                .run()
                .map_err(|e| EstimationError::Backend(e.to_string()))?;
            let state = result.state();
            (
                state.get_termination_status().clone(),
                state.get_iter(),
                state.get_best_param().cloned(),
            )
        };

        if !matches!(
            status,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        ) {
            return Err(EstimationError::NotConverged {
                configuration: self.config.clone(),
                sample,
                iterations,
                reason: format!("{status:?}"),
            });
        }

        let best =
            best.ok_or_else(|| EstimationError::Backend("no best parameter".to_string()))?;

        let (lambda0, r, s) = match best.as_slice() {
            &[lambda0, r, s] => (lambda0, r, s),
            _ => {
                return Err(EstimationError::Backend(format!(
                    "expected 3 parameters, got {}",
                    best.len()
                )))
            }
        };

        let within_range = lambda0.is_finite()
            && r.is_finite()
            && s.is_finite()
            && (0.0..=1.0).contains(&lambda0)
            && r >= 0.0
            && s >= 0.0;
        if !within_range {
            return Err(EstimationError::InvariantViolation { lambda0, r, s });
        }

        let model = MixtureModel::new(lambda0, r, s)
            .map_err(|_| EstimationError::InvariantViolation { lambda0, r, s })?;
        let llik = log_likelihood(&model, &self.pdf, &sample)?;

        info!(
            "[{}] {} after {} iterations, log-likelihood {}",
            self.config.name(),
            model,
            iterations,
            llik
        );

        Ok(ModelEstimate::fitted(
            model,
            sample,
            self.config.name(),
            llik,
            iterations,
        ))
    }

    /// `start` plus one vertex per coordinate, each moved by a fraction of
    /// the coordinate and turned around if that would leave the box.
    fn initial_simplex(&self, start: &StartingPoint) -> Vec<Vec<f64>> {
        let x0 = start.to_array();
        let lower = self.config.lower_bounds().to_array();
        let upper = self.config.upper_bounds().to_array();

        let mut simplex = vec![x0.to_vec()];
        for j in 0..3 {
            let step = if x0[j] != 0.0 {
                SIMPLEX_STEP * x0[j].abs()
            } else {
                SIMPLEX_STEP
            };
            let mut vertex = x0.to_vec();
            vertex[j] = if x0[j] + step < upper[j] {
                x0[j] + step
            } else {
                (x0[j] - step).max(lower[j])
            };
            simplex.push(vertex);
        }
        simplex
    }
}
