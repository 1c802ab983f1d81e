//! Parametric bootstrap of the true positive, true negative and expected
//! discovery rates at a projected sample size.
//!
//! Each iteration draws `k` p-values from the fitted mixture, projects the
//! beta (non-null) draws from the original per-group sample size `n` onto
//! `n*` and classifies every draw against the threshold `τ`:
//!
//! ```text
//!               p > τ    p < τ
//!   uniform       A        C       A + C = u
//!   beta          B        D       B + D = k - u
//!
//!   TP = D / (C + D)   TN = A / (A + B)   EDR = D / (B + D)
//! ```

use crate::adjuster::{PValueAdjuster, TTestPValueAdjuster};
use crate::error::ValidationError;
use crate::model::{MixtureModel, ModelEstimate};
use crate::random::{RandomNumberGenerator, SeedableGenerator, SmallRngGenerator};

use log::debug;
use rayon::prelude::*;
use std::fmt;
use std::marker::PhantomData;

pub const STANDARD_SAMPLE_SIZES: [f64; 14] = [
    2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 20.0, 30.0, 40.0, 50.0, 100.0,
];

pub const STANDARD_THRESHOLDS: [f64; 6] = [0.1, 0.05, 0.01, 0.001, 0.0001, 0.00001];

pub const DEFAULT_NUMBER_OF_ITERATIONS: usize = 100;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapConfiguration {
    pub number_of_iterations: usize,
    pub seed: u64,
}

impl Default for BootstrapConfiguration {
    fn default() -> Self {
        Self {
            number_of_iterations: DEFAULT_NUMBER_OF_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl fmt::Display for BootstrapConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations, seed {}",
            self.number_of_iterations, self.seed
        )
    }
}

/// Classification counts of one bootstrap iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    /// uniform draws above the threshold
    pub a: u64,
    /// adjusted beta draws at or above the threshold
    pub b: u64,
    /// uniform draws at or below the threshold
    pub c: u64,
    /// adjusted beta draws below the threshold
    pub d: u64,
}

impl Counts {
    /// `D / (C + D)`, undefined without discoveries
    pub fn true_positive(&self) -> Option<f64> {
        ratio(self.d, self.c + self.d)
    }

    /// `A / (A + B)`, undefined without non-discoveries
    pub fn true_negative(&self) -> Option<f64> {
        ratio(self.a, self.a + self.b)
    }

    /// `D / (B + D)`, undefined without beta draws
    pub fn expected_discovery(&self) -> Option<f64> {
        ratio(self.d, self.b + self.d)
    }
}

fn ratio(num: u64, denom: u64) -> Option<f64> {
    (denom > 0).then(|| num as f64 / denom as f64)
}

/// Replicate values of one rate with their mean and standard error
#[derive(Debug, Clone, PartialEq)]
pub struct Proportion {
    values: Vec<f64>,
    mean: f64,
    standard_error: f64,
}

impl Proportion {
    /// Mean and sample standard deviation (`n - 1` denominator) of the
    /// defined replicates. NaN when there are too few of them.
    pub fn from_replicates(values: Vec<f64>) -> Self {
        let nn = values.len();
        let mean = if nn > 0 {
            values.iter().sum::<f64>() / nn as f64
        } else {
            f64::NAN
        };
        let standard_error = if nn > 1 {
            let ss: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (nn - 1) as f64).sqrt()
        } else {
            f64::NAN
        };
        Self {
            values,
            mean,
            standard_error,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn standard_error(&self) -> f64 {
        self.standard_error
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of replicates where the rate was defined
    pub fn num_defined(&self) -> usize {
        self.values.len()
    }
}

/// Bootstrap result at one `(n*, τ)` point
#[derive(Debug, Clone)]
pub struct ProportionEstimate {
    pub configuration: BootstrapConfiguration,
    pub model: MixtureModel,
    pub model_configuration: Box<str>,
    pub num_p_values: usize,
    /// equal-group sample size of the original study
    pub sample_size: f64,
    pub projected_sample_size: f64,
    pub threshold: f64,
    pub true_positive: Proportion,
    pub true_negative: Proportion,
    pub expected_discovery: Proportion,
}

impl ProportionEstimate {
    pub const TSV_HEADER: &'static str =
        "threshold\tn_star\tn\tTP\tTP_se\tTP_n\tTN\tTN_se\tTN_n\tEDR\tEDR_se\tEDR_n";

    pub fn to_tsv_row(&self) -> Box<str> {
        let mut cells = vec![
            self.threshold.to_string(),
            self.projected_sample_size.to_string(),
            self.sample_size.to_string(),
        ];
        for prop in [
            &self.true_positive,
            &self.true_negative,
            &self.expected_discovery,
        ] {
            cells.push(prop.mean().to_string());
            cells.push(prop.standard_error().to_string());
            cells.push(prop.num_defined().to_string());
        }
        cells.join("\t").into_boxed_str()
    }
}

impl fmt::Display for ProportionEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "model: {} ({})", self.model, self.model_configuration)?;
        writeln!(f, "number of p-values: {}", self.num_p_values)?;
        writeln!(f, "bootstrap: {}", self.configuration)?;
        writeln!(
            f,
            "n = {}, n* = {}, threshold = {}",
            self.sample_size, self.projected_sample_size, self.threshold
        )?;
        for (name, prop) in [
            ("TP", &self.true_positive),
            ("TN", &self.true_negative),
            ("EDR", &self.expected_discovery),
        ] {
            writeln!(
                f,
                "{} = {} (SE {}, {} replicates)",
                name,
                prop.mean(),
                prop.standard_error(),
                prop.num_defined()
            )?;
        }
        Ok(())
    }
}

/// `2 / (1/N1 + 1/N2)`, or `N1` for equal groups
pub fn equal_group_sample_size(n1: usize, n2: usize) -> f64 {
    if n1 == n2 {
        n1 as f64
    } else {
        2.0 / (1.0 / n1 as f64 + 1.0 / n2 as f64)
    }
}

/// Grid points ordered threshold-major
pub fn grid_points(sample_sizes: &[f64], thresholds: &[f64]) -> Vec<(f64, f64)> {
    thresholds
        .iter()
        .flat_map(|&tau| sample_sizes.iter().map(move |&n_star| (n_star, tau)))
        .collect()
}

pub struct BootstrapEstimator<A = TTestPValueAdjuster, G = SmallRngGenerator>
where
    A: PValueAdjuster,
    G: SeedableGenerator,
{
    config: BootstrapConfiguration,
    adjuster: A,
    _rng: PhantomData<fn() -> G>,
}

impl BootstrapEstimator<TTestPValueAdjuster, SmallRngGenerator> {
    /// t-test adjuster and `SmallRng` streams
    pub fn standard(config: BootstrapConfiguration) -> Self {
        Self::new(config, TTestPValueAdjuster::default())
    }
}

impl<A, G> BootstrapEstimator<A, G>
where
    A: PValueAdjuster,
    G: SeedableGenerator,
{
    pub fn new(config: BootstrapConfiguration, adjuster: A) -> Self {
        Self {
            config,
            adjuster,
            _rng: PhantomData,
        }
    }

    pub fn configuration(&self) -> &BootstrapConfiguration {
        &self.config
    }

    /// One bootstrap iteration over `num_p_values` draws
    pub fn bootstrap_counts<R: RandomNumberGenerator>(
        &self,
        model: &MixtureModel,
        num_p_values: u64,
        n: f64,
        n_star: f64,
        threshold: f64,
        rng: &mut R,
    ) -> Counts {
        let lambda0 = model.lambda0();
        let u = if lambda0 == 0.0 {
            0
        } else if lambda0 == 1.0 {
            num_p_values
        } else {
            rng.next_binomial(num_p_values, lambda0)
        };

        let mut counts = Counts::default();

        for _ in 0..u {
            if rng.next_uniform() > threshold {
                counts.a += 1;
            }
        }
        counts.c = u - counts.a;

        let num_beta = num_p_values - u;
        for _ in 0..num_beta {
            let p = rng.next_beta(model.r(), model.s());
            if self.adjuster.adjust_p_value(p, n, n_star) < threshold {
                counts.d += 1;
            }
        }
        counts.b = num_beta - counts.d;

        counts
    }

    /// TP, TN and EDR at `(n*, τ)` for a study with groups of `n1` and `n2`
    pub fn estimate_proportions(
        &self,
        estimate: &ModelEstimate,
        n1: usize,
        n2: usize,
        n_star: f64,
        threshold: f64,
    ) -> Result<ProportionEstimate, ValidationError> {
        if n1 < 1 {
            return Err(ValidationError::Argument {
                name: "N1",
                value: n1 as f64,
                reason: "group size must be at least 1",
            });
        }
        if n2 < 1 {
            return Err(ValidationError::Argument {
                name: "N2",
                value: n2 as f64,
                reason: "group size must be at least 1",
            });
        }
        let n = equal_group_sample_size(n1, n2);
        if n.is_nan() || n <= 1.0 {
            return Err(ValidationError::Argument {
                name: "n",
                value: n,
                reason: "equal-group sample size must exceed 1",
            });
        }
        if n_star.is_nan() || n_star < 2.0 {
            return Err(ValidationError::Argument {
                name: "n*",
                value: n_star,
                reason: "projected sample size must be at least 2",
            });
        }
        if threshold.is_nan() || !(0.0..=1.0).contains(&threshold) {
            return Err(ValidationError::Argument {
                name: "threshold",
                value: threshold,
                reason: "threshold must be in [0, 1]",
            });
        }
        if self.config.number_of_iterations < 1 {
            return Err(ValidationError::Argument {
                name: "iterations",
                value: 0.0,
                reason: "at least one bootstrap iteration is required",
            });
        }

        let model = *estimate.model();
        let num_p_values = estimate.num_p_values() as u64;
        let seed = self.config.seed;

        let counts: Vec<Counts> = (0..self.config.number_of_iterations)
            .into_par_iter()
            .map(|i| {
                let mut rng = G::from_seed(seed.wrapping_add(i as u64));
                self.bootstrap_counts(&model, num_p_values, n, n_star, threshold, &mut rng)
            })
            .collect();

        let true_positive =
            Proportion::from_replicates(counts.iter().filter_map(|c| c.true_positive()).collect());
        let true_negative =
            Proportion::from_replicates(counts.iter().filter_map(|c| c.true_negative()).collect());
        let expected_discovery = Proportion::from_replicates(
            counts
                .iter()
                .filter_map(|c| c.expected_discovery())
                .collect(),
        );

        debug!(
            "n* = {}, threshold = {}: TP {:.4}, TN {:.4}, EDR {:.4}",
            n_star,
            threshold,
            true_positive.mean(),
            true_negative.mean(),
            expected_discovery.mean()
        );

        Ok(ProportionEstimate {
            configuration: self.config,
            model,
            model_configuration: estimate.configuration().into(),
            num_p_values: estimate.num_p_values(),
            sample_size: n,
            projected_sample_size: n_star,
            threshold,
            true_positive,
            true_negative,
            expected_discovery,
        })
    }

    /// Sweep `sample_sizes × thresholds`, threshold-major
    pub fn estimate_grid(
        &self,
        estimate: &ModelEstimate,
        n1: usize,
        n2: usize,
        sample_sizes: &[f64],
        thresholds: &[f64],
    ) -> Result<Vec<ProportionEstimate>, ValidationError> {
        grid_points(sample_sizes, thresholds)
            .into_iter()
            .map(|(n_star, tau)| self.estimate_proportions(estimate, n1, n2, n_star, tau))
            .collect()
    }

    pub fn estimate_standard_grid(
        &self,
        estimate: &ModelEstimate,
        n1: usize,
        n2: usize,
    ) -> Result<Vec<ProportionEstimate>, ValidationError> {
        self.estimate_grid(
            estimate,
            n1,
            n2,
            &STANDARD_SAMPLE_SIZES,
            &STANDARD_THRESHOLDS,
        )
    }
}
