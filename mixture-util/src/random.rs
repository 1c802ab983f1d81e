use crate::model::MixtureModel;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Binomial, Distribution};

/// Draws needed by the bootstrap
pub trait RandomNumberGenerator {
    /// Number of successes in `n` trials with success probability `p`.
    /// Panics on a NaN `p`.
    fn next_binomial(&mut self, n: u64, p: f64) -> u64;

    /// Uniform on [0, 1)
    fn next_uniform(&mut self) -> f64;

    /// Beta(r, s); NaN for shapes that do not define a distribution
    fn next_beta(&mut self, r: f64, s: f64) -> f64;
}

/// A generator that can be rebuilt deterministically from a seed, one
/// stream per bootstrap iteration.
pub trait SeedableGenerator: RandomNumberGenerator + Sized {
    fn from_seed(seed: u64) -> Self;
}

/// `SmallRng` with `rand_distr` samplers
#[derive(Debug, Clone)]
pub struct SmallRngGenerator {
    rng: SmallRng,
}

impl SmallRngGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomNumberGenerator for SmallRngGenerator {
    fn next_binomial(&mut self, n: u64, p: f64) -> u64 {
        if p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return n;
        }
        match Binomial::new(n, p) {
            Ok(binom) => binom.sample(&mut self.rng),
            Err(e) => unreachable!("binomial({}, {}): {}", n, p, e),
        }
    }

    fn next_uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn next_beta(&mut self, r: f64, s: f64) -> f64 {
        match Beta::new(r, s) {
            Ok(beta) => beta.sample(&mut self.rng),
            Err(_) => f64::NAN,
        }
    }
}

impl SeedableGenerator for SmallRngGenerator {
    fn from_seed(seed: u64) -> Self {
        Self::new(seed)
    }
}

/// Draw `size` p-values from the mixture, picking the component of each
/// draw independently
pub fn sample_p_values<R: RandomNumberGenerator>(
    model: &MixtureModel,
    size: usize,
    rng: &mut R,
) -> Vec<f64> {
    (0..size)
        .map(|_| {
            if rng.next_uniform() < model.lambda0() {
                rng.next_uniform()
            } else {
                rng.next_beta(model.r(), model.s())
            }
        })
        .collect()
}
