pub use log::{info, warn};

use mixture_util::parser::read_p_values;
use mixture_util::{
    EstimationError, MixtureModelEstimator, ModelEstimate, OptimizerConfiguration,
};

pub fn init_logger(verbose: bool) {
    if verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}

/// Read p-values, reporting the lines that had to be skipped
pub fn read_p_value_file(input_file: &str) -> anyhow::Result<Vec<f64>> {
    let mut num_bad = 0;
    let pvalues = read_p_values(input_file, |line_number, line| {
        num_bad += 1;
        warn!("{}:{}: skipping \"{}\"", input_file, line_number, line);
    })?;

    if num_bad > 0 {
        warn!("skipped {} line(s) that are not p-values", num_bad);
    }
    info!("read {} p-values from {}", pvalues.len(), input_file);
    Ok(pvalues)
}

/// Fit with the chosen configuration; optionally retry with the restricted
/// one when the first fit does not converge
pub fn fit_mixture_model(
    pvalues: &[f64],
    restricted: bool,
    fallback_restricted: bool,
) -> anyhow::Result<ModelEstimate> {
    let config = if restricted {
        OptimizerConfiguration::restricted()
    } else {
        OptimizerConfiguration::standard()
    };

    match MixtureModelEstimator::new(config).estimate(pvalues) {
        Ok(estimate) => Ok(estimate),
        Err(err @ EstimationError::NotConverged { .. }) if fallback_restricted && !restricted => {
            warn!("{}", err);
            warn!("retrying with the restricted configuration");
            let sample = err.sample().unwrap_or(pvalues);
            Ok(MixtureModelEstimator::new(OptimizerConfiguration::restricted())
                .estimate(sample)?)
        }
        Err(err) => Err(err.into()),
    }
}
