use crate::common::*;

use clap::Parser;
use indicatif::ProgressIterator;
use mixture_util::bootstrap::*;
use mixture_util::common_io::write_lines;

#[derive(Parser, Debug, Clone)]
pub struct PowerArgs {
    /// p-value file, one value per line (plain or `.gz`; `-` for stdin)
    pvalue_file: Box<str>,

    /// number of samples in the first group of the original study
    #[arg(long)]
    n1: usize,

    /// number of samples in the second group of the original study
    #[arg(long)]
    n2: usize,

    /// number of bootstrap iterations per grid point
    #[arg(long, short = 'm', default_value_t = DEFAULT_NUMBER_OF_ITERATIONS)]
    iterations: usize,

    /// random seed; iteration `i` uses `seed + i`
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// significance thresholds (comma-separated)
    #[arg(long, short = 't', value_delimiter(','))]
    thresholds: Option<Vec<f64>>,

    /// projected per-group sample sizes (comma-separated)
    #[arg(long, short = 'n', value_delimiter(','))]
    sample_sizes: Option<Vec<f64>>,

    /// constrain the beta component to 0 < r < 1 and s > 1
    #[arg(long, default_value_t = false)]
    restricted: bool,

    /// retry with the restricted configuration if the default fit does
    /// not converge
    #[arg(long, default_value_t = false)]
    fallback_restricted: bool,

    /// number of threads for the bootstrap
    #[arg(long, short = 'j')]
    threads: Option<usize>,

    /// output header; writes `{out}.power.tsv`
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_power(args: PowerArgs) -> anyhow::Result<()> {
    init_logger(args.verbose);

    let pvalues = read_p_value_file(&args.pvalue_file)?;
    let estimate = fit_mixture_model(&pvalues, args.restricted, args.fallback_restricted)?;
    info!("fitted model:\n{}", estimate);

    let sample_sizes = args
        .sample_sizes
        .clone()
        .unwrap_or_else(|| STANDARD_SAMPLE_SIZES.to_vec());
    let thresholds = args
        .thresholds
        .clone()
        .unwrap_or_else(|| STANDARD_THRESHOLDS.to_vec());

    let config = BootstrapConfiguration {
        number_of_iterations: args.iterations,
        seed: args.seed,
    };
    let bootstrap = BootstrapEstimator::standard(config);

    let num_threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()?;

    let points = grid_points(&sample_sizes, &thresholds);
    info!(
        "bootstrap over {} grid points ({}, {} threads)",
        points.len(),
        config,
        num_threads
    );

    let mut results = Vec::with_capacity(points.len());
    for (n_star, tau) in points.into_iter().progress() {
        let result = pool.install(|| {
            bootstrap.estimate_proportions(&estimate, args.n1, args.n2, n_star, tau)
        })?;
        results.push(result);
    }

    if let Some(first) = results.first() {
        info!("first grid point:\n{}", first);
    }

    let mut lines: Vec<Box<str>> = vec![ProportionEstimate::TSV_HEADER.into()];
    lines.extend(results.iter().map(|x| x.to_tsv_row()));

    let power_file = format!("{}.power.tsv", args.out);
    write_lines(&lines, &power_file)?;
    info!("wrote {}", power_file);
    Ok(())
}
