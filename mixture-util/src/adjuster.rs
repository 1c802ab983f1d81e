use crate::backend::{StatrsStudentsT, StudentsTDistribution};

/// Projects a p-value observed with one per-group sample size onto another.
pub trait PValueAdjuster: Send + Sync {
    /// * `p` - p-value observed with `n` samples per group
    /// * `n` - original per-group sample size
    /// * `n_star` - projected per-group sample size
    fn adjust_p_value(&self, p: f64, n: f64, n_star: f64) -> f64;
}

/// Two-sample t-test back-transform.
///
/// The p-value is turned back into a t statistic with `2n - 2` degrees of
/// freedom, scaled by `sqrt(n* / n)` and turned into a two-sided p-value
/// with `2n* - 2` degrees of freedom.
#[derive(Debug, Clone, Copy, Default)]
pub struct TTestPValueAdjuster<T: StudentsTDistribution = StatrsStudentsT> {
    dist: T,
}

impl<T: StudentsTDistribution> TTestPValueAdjuster<T> {
    pub fn new(dist: T) -> Self {
        Self { dist }
    }
}

impl<T: StudentsTDistribution> PValueAdjuster for TTestPValueAdjuster<T> {
    fn adjust_p_value(&self, p: f64, n: f64, n_star: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        if p >= 1.0 {
            return 1.0;
        }

        let df = 2.0 * n - 2.0;
        let t = self.dist.inverse_cdf(p / 2.0, df);
        let t_star = t * (n_star / n).sqrt();
        let df_star = 2.0 * n_star - 2.0;

        2.0 * self.dist.cdf(-t_star.abs(), df_star)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_adjust_reference_value() {
        let adjuster = TTestPValueAdjuster::<StatrsStudentsT>::default();
        let p = adjuster.adjust_p_value(0.05, 5.0, 10.0);
        assert_relative_eq!(p, 0.00434, max_relative = 0.01);
    }

    #[test]
    fn test_adjust_same_size_is_identity() {
        let adjuster = TTestPValueAdjuster::<StatrsStudentsT>::default();
        for &p in &[0.001, 0.04, 0.3, 0.8] {
            assert_abs_diff_eq!(adjuster.adjust_p_value(p, 6.0, 6.0), p, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_adjust_boundaries_and_direction() {
        let adjuster = TTestPValueAdjuster::<StatrsStudentsT>::default();
        assert_eq!(adjuster.adjust_p_value(0.0, 5.0, 10.0), 0.0);
        assert_eq!(adjuster.adjust_p_value(-0.1, 5.0, 10.0), 0.0);
        assert_eq!(adjuster.adjust_p_value(1.0, 5.0, 10.0), 1.0);

        // larger samples give smaller p-values, smaller samples larger ones
        assert!(adjuster.adjust_p_value(0.1, 5.0, 20.0) < 0.1);
        assert!(adjuster.adjust_p_value(0.1, 5.0, 3.0) > 0.1);

        // fractional sample sizes from unequal groups
        let p = adjuster.adjust_p_value(0.02, 5.217391, 7.5);
        assert!(p > 0.0 && p < 0.02);
    }
}
