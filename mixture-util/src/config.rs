use crate::density::{log_likelihood, ProbabilityDensityFunction};
use crate::error::ValidationError;
use crate::model::MixtureModel;
use std::fmt;

pub const DEFAULT_TOLERANCE: f64 = 1e-10;
pub const DEFAULT_MAX_ITERS: u64 = 5_000;

/// Bounds on `(lambda0, r, s)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBounds {
    pub lambda0: f64,
    pub r: f64,
    pub s: f64,
}

impl ParameterBounds {
    pub fn to_array(&self) -> [f64; 3] {
        [self.lambda0, self.r, self.s]
    }
}

/// Seed for the local optimizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartingPoint {
    pub lambda0: f64,
    pub r: f64,
    pub s: f64,
}

impl StartingPoint {
    pub fn to_array(&self) -> [f64; 3] {
        [self.lambda0, self.r, self.s]
    }
}

impl fmt::Display for StartingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lambda0, self.r, self.s)
    }
}

/// Candidate values for the starting-point grid search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGrid {
    pub lambda0: Vec<f64>,
    pub r: Vec<f64>,
    pub s: Vec<f64>,
}

/// Feasible set, grid search space and stopping rule of the optimizer
///
/// * `standard()` - `0 < lambda0 < 1`, `r > 0`, `s > 0`
/// * `restricted()` - `0 < lambda0 < 1`, `0 < r < 1`, `s > 1`; favours a
///   decreasing beta component when the histogram has an unusual shape
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfiguration {
    name: Box<str>,
    lower: ParameterBounds,
    upper: ParameterBounds,
    grid: SearchGrid,
    tolerance: f64,
    max_iters: u64,
}

impl Default for OptimizerConfiguration {
    fn default() -> Self {
        Self::standard()
    }
}

impl OptimizerConfiguration {
    pub fn standard() -> Self {
        Self {
            name: "default".into(),
            lower: ParameterBounds {
                lambda0: 0.0,
                r: 0.0,
                s: 0.0,
            },
            upper: ParameterBounds {
                lambda0: 1.0,
                r: f64::MAX,
                s: f64::MAX,
            },
            grid: SearchGrid {
                lambda0: vec![0.6, 0.8, 0.9],
                r: vec![0.5, 1.0, 1.5, 2.0],
                s: vec![0.75, 1.75, 2.75, 3.75],
            },
            tolerance: DEFAULT_TOLERANCE,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }

    pub fn restricted() -> Self {
        Self {
            name: "restricted".into(),
            lower: ParameterBounds {
                lambda0: 0.0,
                r: 0.0,
                s: 1.0,
            },
            upper: ParameterBounds {
                lambda0: 1.0,
                r: 1.0,
                s: f64::MAX,
            },
            grid: SearchGrid {
                lambda0: vec![0.6, 0.8, 0.9],
                r: vec![0.5, 0.75, 0.9],
                s: vec![1.25, 1.75, 2.25, 2.75, 3.25, 3.75],
            },
            tolerance: DEFAULT_TOLERANCE,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }

    /// A custom configuration. Every grid value must lie within the bounds.
    pub fn custom(
        name: &str,
        lower: ParameterBounds,
        upper: ParameterBounds,
        grid: SearchGrid,
    ) -> Result<Self, ValidationError> {
        let lb = lower.to_array();
        let ub = upper.to_array();
        let names = ["lambda0", "r", "s"];
        for j in 0..3 {
            if lb[j].is_nan() || ub[j].is_nan() || lb[j] >= ub[j] {
                return Err(ValidationError::Argument {
                    name: names[j],
                    value: lb[j],
                    reason: "lower bound must be below the upper bound",
                });
            }
        }
        if lower.lambda0 < 0.0 || upper.lambda0 > 1.0 {
            return Err(ValidationError::Argument {
                name: "lambda0",
                value: upper.lambda0,
                reason: "lambda0 bounds must lie within [0, 1]",
            });
        }
        if lower.r < 0.0 || lower.s < 0.0 {
            return Err(ValidationError::Argument {
                name: "r/s",
                value: lower.r.min(lower.s),
                reason: "beta shape bounds must be non-negative",
            });
        }

        let axes = [&grid.lambda0, &grid.r, &grid.s];
        for j in 0..3 {
            if axes[j].is_empty() {
                return Err(ValidationError::Argument {
                    name: names[j],
                    value: f64::NAN,
                    reason: "empty grid",
                });
            }
            if let Some(&v) = axes[j].iter().find(|&&v| !(v > lb[j] && v < ub[j])) {
                return Err(ValidationError::Argument {
                    name: names[j],
                    value: v,
                    reason: "grid value outside the feasible set",
                });
            }
        }

        Ok(Self {
            name: name.into(),
            lower,
            upper,
            grid,
            tolerance: DEFAULT_TOLERANCE,
            max_iters: DEFAULT_MAX_ITERS,
        })
    }

    /// Relative function-value tolerance of the simplex
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lower_bounds(&self) -> &ParameterBounds {
        &self.lower
    }

    pub fn upper_bounds(&self) -> &ParameterBounds {
        &self.upper
    }

    pub fn grid(&self) -> &SearchGrid {
        &self.grid
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Exhaustive grid search for the starting point with the largest
    /// finite log-likelihood. Iterates `lambda0` outer, `r` middle, `s`
    /// inner and keeps the first maximum found.
    pub fn find_starting_point<F>(
        &self,
        pdf: &F,
        sample: &[f64],
    ) -> Result<StartingPoint, ValidationError>
    where
        F: ProbabilityDensityFunction + ?Sized,
    {
        if sample.is_empty() {
            return Err(ValidationError::EmptySample);
        }

        let mut best = StartingPoint {
            lambda0: self.grid.lambda0[0],
            r: self.grid.r[0],
            s: self.grid.s[0],
        };
        let mut max_llik = f64::NEG_INFINITY;

        for &lambda0 in &self.grid.lambda0 {
            for &r in &self.grid.r {
                for &s in &self.grid.s {
                    let model = MixtureModel::new(lambda0, r, s)?;
                    let llik = log_likelihood(&model, pdf, sample)?;
                    if llik.is_finite() && llik > max_llik {
                        max_llik = llik;
                        best = StartingPoint { lambda0, r, s };
                    }
                }
            }
        }
        Ok(best)
    }
}

impl fmt::Display for OptimizerConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "configuration: {}", self.name)?;
        writeln!(
            f,
            "lambda0 bounds: [{},{}]",
            self.lower.lambda0, self.upper.lambda0
        )?;
        writeln!(f, "r bounds: [{},{}]", self.lower.r, self.upper.r)?;
        write!(f, "s bounds: [{},{}]", self.lower.s, self.upper.s)
    }
}
