//! Numeric backends for the beta and Student-t distributions.
//!
//! The density, the optimizer and the p-value adjuster only see these
//! traits, so a different special-function library can be swapped in
//! without touching the estimation code.

use special::Gamma as SpecialGamma;
use statrs::distribution::{Beta, ContinuousCDF, StudentsT};

/// Beta(r, s) density and distribution function on [0, 1]
pub trait BetaDistribution: Send + Sync {
    /// log density at `x`; `-inf` where the density vanishes
    fn ln_pdf(&self, x: f64, r: f64, s: f64) -> f64;

    /// P(X <= x)
    fn cdf(&self, x: f64, r: f64, s: f64) -> f64;

    fn pdf(&self, x: f64, r: f64, s: f64) -> f64 {
        self.ln_pdf(x, r, s).exp()
    }
}

/// Student-t distribution with (possibly fractional) degrees of freedom
pub trait StudentsTDistribution: Send + Sync {
    fn cdf(&self, t: f64, df: f64) -> f64;

    fn inverse_cdf(&self, p: f64, df: f64) -> f64;
}

/// `ln B(r, s) = lgamma(r) + lgamma(s) - lgamma(r + s)`
#[inline]
pub fn ln_beta_function(r: f64, s: f64) -> f64 {
    SpecialGamma::ln_gamma(r).0 + SpecialGamma::ln_gamma(s).0 - SpecialGamma::ln_gamma(r + s).0
}

/// `a * ln(x)` with the convention `0 * ln(0) = 0`
#[inline]
fn xlogy(a: f64, x: f64) -> f64 {
    if a == 0.0 {
        0.0
    } else {
        a * x.ln()
    }
}

/// Log-gamma density kernel with the `statrs` incomplete beta for the CDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBeta;

impl BetaDistribution for DefaultBeta {
    fn ln_pdf(&self, x: f64, r: f64, s: f64) -> f64 {
        if !(0.0..=1.0).contains(&x) || r <= 0.0 || s <= 0.0 {
            return f64::NAN;
        }
        xlogy(r - 1.0, x) + xlogy(s - 1.0, 1.0 - x) - ln_beta_function(r, s)
    }

    fn cdf(&self, x: f64, r: f64, s: f64) -> f64 {
        match Beta::new(r, s) {
            Ok(beta) => beta.cdf(x.clamp(0.0, 1.0)),
            Err(_) => f64::NAN,
        }
    }
}

/// Student-t backed by `statrs::distribution::StudentsT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatrsStudentsT;

impl StudentsTDistribution for StatrsStudentsT {
    fn cdf(&self, t: f64, df: f64) -> f64 {
        match StudentsT::new(0.0, 1.0, df) {
            Ok(dist) => dist.cdf(t),
            Err(_) => f64::NAN,
        }
    }

    fn inverse_cdf(&self, p: f64, df: f64) -> f64 {
        if p.is_nan() {
            return f64::NAN;
        }
        if p <= 0.0 {
            return f64::NEG_INFINITY;
        }
        if p >= 1.0 {
            return f64::INFINITY;
        }
        match StudentsT::new(0.0, 1.0, df) {
            Ok(dist) => dist.inverse_cdf(p),
            Err(_) => f64::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_beta_uniform_special_case() {
        let beta = DefaultBeta;
        for &x in &[0.0, 0.1, 0.5, 0.99, 1.0] {
            assert_abs_diff_eq!(beta.pdf(x, 1.0, 1.0), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(beta.cdf(x, 1.0, 1.0), x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_beta_density_closed_form() {
        // Beta(2, 3): 12 x (1-x)^2
        let beta = DefaultBeta;
        let x = 0.3_f64;
        let expected = 12.0 * x * (1.0 - x).powi(2);
        assert_abs_diff_eq!(beta.pdf(x, 2.0, 3.0), expected, epsilon = 1e-10);

        // Beta(2, 3) cdf: 6x^2 - 8x^3 + 3x^4
        let expected_cdf = 6.0 * x.powi(2) - 8.0 * x.powi(3) + 3.0 * x.powi(4);
        assert_abs_diff_eq!(beta.cdf(x, 2.0, 3.0), expected_cdf, epsilon = 1e-10);
    }

    #[test]
    fn test_beta_density_boundaries() {
        let beta = DefaultBeta;
        assert_eq!(beta.pdf(0.0, 2.0, 3.0), 0.0);
        assert!(beta.pdf(0.0, 0.5, 3.0).is_infinite());
        assert!(beta.ln_pdf(0.5, -1.0, 3.0).is_nan());
        assert!(beta.ln_pdf(1.5, 1.0, 3.0).is_nan());
    }

    #[test]
    fn test_students_t_round_trip() {
        let t = StatrsStudentsT;
        for &df in &[2.0, 8.0, 11.333] {
            for &p in &[0.001, 0.025, 0.3, 0.5, 0.9] {
                let q = t.inverse_cdf(p, df);
                assert_abs_diff_eq!(t.cdf(q, df), p, epsilon = 1e-6);
            }
        }
        // two-sided 5% critical value at 8 degrees of freedom
        assert_abs_diff_eq!(t.inverse_cdf(0.025, 8.0), -2.306004, epsilon = 1e-4);
        assert_eq!(t.inverse_cdf(0.0, 8.0), f64::NEG_INFINITY);
    }
}
