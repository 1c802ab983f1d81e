//! Mixture density and log-likelihood
//!
//! ```text
//! f(x; lambda0, r, s) = lambda0 + (1 - lambda0) * x^(r-1) (1-x)^(s-1) / B(r, s)
//! ln L = sum_i ln f(x_i)
//! ```

use crate::backend::{BetaDistribution, DefaultBeta};
use crate::error::ValidationError;
use crate::model::MixtureModel;

/// `lambda0` may exceed one by this much while the optimizer probes the
/// boundary; anything further is a domain error.
pub const LAMBDA0_SLACK: f64 = 2.966479395e-7;

pub trait ProbabilityDensityFunction: Send + Sync {
    /// Mixture density at a p-value `x` in [0, 1]
    fn evaluate(&self, model: &MixtureModel, x: f64) -> Result<f64, ValidationError>;
}

/// Uniform + beta mixture density over a pluggable beta backend
#[derive(Debug, Clone, Copy, Default)]
pub struct BetaMixtureDensity<B: BetaDistribution = DefaultBeta> {
    beta: B,
}

impl<B: BetaDistribution> BetaMixtureDensity<B> {
    pub fn new(beta: B) -> Self {
        Self { beta }
    }

    pub fn beta(&self) -> &B {
        &self.beta
    }
}

impl<B: BetaDistribution> ProbabilityDensityFunction for BetaMixtureDensity<B> {
    fn evaluate(&self, model: &MixtureModel, x: f64) -> Result<f64, ValidationError> {
        if x.is_nan() || !(0.0..=1.0).contains(&x) {
            return Err(ValidationError::Argument {
                name: "x",
                value: x,
                reason: "p-value must be in [0, 1]",
            });
        }

        let lambda0 = model.lambda0();
        if lambda0.is_nan() || !(0.0..=1.0 + LAMBDA0_SLACK).contains(&lambda0) {
            return Err(ValidationError::Parameter {
                name: "lambda0",
                value: lambda0,
            });
        }
        if model.r().is_nan() || model.r() < 0.0 {
            return Err(ValidationError::Parameter {
                name: "r",
                value: model.r(),
            });
        }
        if model.s().is_nan() || model.s() < 0.0 {
            return Err(ValidationError::Parameter {
                name: "s",
                value: model.s(),
            });
        }

        if lambda0 == 1.0 {
            return Ok(1.0);
        }

        let beta_pdf = self.beta.pdf(x, model.r(), model.s());
        Ok(lambda0 + (1.0 - lambda0) * beta_pdf)
    }
}

/// Sum of `ln f(x_i)` over the sample.
///
/// p-values of exactly 0 or 1 are evaluated at the nearest interior point
/// (`f64::EPSILON` away), where the density is finite for any shape. A
/// density at or below zero gives `-inf` (or NaN); the value is returned as
/// is so that the optimizer can reject such points.
pub fn log_likelihood<F>(
    model: &MixtureModel,
    pdf: &F,
    sample: &[f64],
) -> Result<f64, ValidationError>
where
    F: ProbabilityDensityFunction + ?Sized,
{
    if sample.is_empty() {
        return Err(ValidationError::EmptySample);
    }
    let mut sum = 0.0;
    for &x in sample {
        sum += pdf.evaluate(model, interior(x))?.ln();
    }
    Ok(sum)
}

#[inline]
fn interior(x: f64) -> f64 {
    if x == 0.0 {
        f64::EPSILON
    } else if x == 1.0 {
        1.0 - f64::EPSILON
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_density_is_true_pdf() {
        // Beta(2, 3) = 12 x (1-x)^2
        let pdf = BetaMixtureDensity::<DefaultBeta>::default();
        let model = MixtureModel::new(0.25, 2.0, 3.0).unwrap();
        let x = 0.4_f64;
        let expected = 0.25 + 0.75 * 12.0 * x * (1.0 - x).powi(2);
        assert_abs_diff_eq!(pdf.evaluate(&model, x).unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn test_density_integrates_to_one() {
        let pdf = BetaMixtureDensity::<DefaultBeta>::default();
        let model = MixtureModel::new(0.7, 1.5, 2.75).unwrap();
        let nn = 20_000;
        let h = 1.0 / nn as f64;
        let total: f64 = (0..nn)
            .map(|i| pdf.evaluate(&model, (i as f64 + 0.5) * h).unwrap() * h)
            .sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_density_domain() {
        let pdf = BetaMixtureDensity::<DefaultBeta>::default();
        let model = MixtureModel::new(0.5, 1.0, 2.0).unwrap();
        assert!(pdf.evaluate(&model, -0.01).is_err());
        assert!(pdf.evaluate(&model, 1.01).is_err());
        assert!(pdf.evaluate(&model, f64::NAN).is_err());

        let lenient = MixtureModel::unchecked(1.0 + 1e-7, 1.0, 2.0);
        assert!(pdf.evaluate(&lenient, 0.5).is_ok());
        let too_far = MixtureModel::unchecked(1.0 + 1e-6, 1.0, 2.0);
        assert!(pdf.evaluate(&too_far, 0.5).is_err());
    }

    #[test]
    fn test_log_likelihood_sum() {
        let pdf = BetaMixtureDensity::<DefaultBeta>::default();
        let model = MixtureModel::new(0.6, 0.5, 1.5).unwrap();
        let sample = [0.01, 0.2, 0.5, 0.93];
        let expected: f64 = sample
            .iter()
            .map(|&x| pdf.evaluate(&model, x).unwrap().ln())
            .sum();
        assert_abs_diff_eq!(
            log_likelihood(&model, &pdf, &sample).unwrap(),
            expected,
            epsilon = 1e-12
        );

        // uniform model: every density is one
        let uniform = MixtureModel::new(1.0, 2.0, 2.0).unwrap();
        assert_eq!(log_likelihood(&uniform, &pdf, &sample).unwrap(), 0.0);

        assert_eq!(
            log_likelihood(&model, &pdf, &[]),
            Err(ValidationError::EmptySample)
        );
        assert!(log_likelihood(&model, &pdf, &[0.2, 1.5]).is_err());
    }

    #[test]
    fn test_log_likelihood_propagates_negative_infinity() {
        let pdf = BetaMixtureDensity::<DefaultBeta>::default();
        // no uniform mass and a beta density that underflows at x = 0.01
        let model = MixtureModel::new(0.0, 400.0, 3.0).unwrap();
        assert_eq!(pdf.evaluate(&model, 0.01).unwrap(), 0.0);
        let ll = log_likelihood(&model, &pdf, &[0.3, 0.01]).unwrap();
        assert_eq!(ll, f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_likelihood_finite_at_zero_and_one() {
        let pdf = BetaMixtureDensity::<DefaultBeta>::default();
        // both shapes below one: the density itself is infinite at 0 and 1
        let model = MixtureModel::new(0.8, 0.5, 0.7).unwrap();
        assert_eq!(pdf.evaluate(&model, 0.0).unwrap(), f64::INFINITY);
        assert_eq!(pdf.evaluate(&model, 1.0).unwrap(), f64::INFINITY);

        let ll = log_likelihood(&model, &pdf, &[0.0, 0.4, 1.0]).unwrap();
        assert!(ll.is_finite(), "log-likelihood {}", ll);
        let nudged = log_likelihood(&model, &pdf, &[f64::EPSILON, 0.4, 1.0 - f64::EPSILON]);
        assert_abs_diff_eq!(ll, nudged.unwrap(), epsilon = 1e-12);
    }
}
