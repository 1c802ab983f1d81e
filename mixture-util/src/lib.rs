//! Uniform + beta mixture models of p-value distributions.
//!
//! A sample of p-values from many hypothesis tests is modelled as
//!
//! ```text
//! f(x) = lambda0 + (1 - lambda0) * Beta(x; r, s)
//! ```
//!
//! where the uniform part collects the true nulls. The fitted model then
//! drives a parametric bootstrap that projects the true positive, true
//! negative and expected discovery rates onto other sample sizes and
//! significance thresholds.

/// Mixture parameters and fitted estimates
pub mod model;

/// Beta and Student-t distribution backends
pub mod backend;

/// Mixture density and log-likelihood
pub mod density;

/// Optimizer bounds, starting-point grid and stopping rule
pub mod config;

/// Constrained maximum likelihood estimator (Nelder-Mead)
pub mod estimator;

/// p-value projection between sample sizes
pub mod adjuster;

/// Random draws for the bootstrap
pub mod random;

/// Parametric bootstrap of TP, TN and EDR
pub mod bootstrap;

/// Parse p-value lists
pub mod parser;

/// Observed vs. fitted histogram
pub mod histogram;

/// Buffered (gzipped) file reading and writing
pub mod common_io;

/// Error types
pub mod error;

pub use bootstrap::{BootstrapConfiguration, BootstrapEstimator, ProportionEstimate};
pub use config::OptimizerConfiguration;
pub use error::{EstimationError, ValidationError};
pub use estimator::MixtureModelEstimator;
pub use model::{MixtureModel, ModelEstimate};
