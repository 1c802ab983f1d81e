use crate::common::*;

use clap::Parser;
use mixture_util::common_io::write_lines;
use mixture_util::random::{sample_p_values, SmallRngGenerator};
use mixture_util::MixtureModel;

#[derive(Parser, Debug, Clone)]
pub struct SimArgs {
    /// proportion of null (uniform) p-values
    #[arg(long)]
    lambda0: f64,

    /// first beta shape parameter
    #[arg(long, short)]
    r: f64,

    /// second beta shape parameter
    #[arg(long, short)]
    s: f64,

    /// number of p-values
    #[arg(long, short = 'k', default_value_t = 10000)]
    size: usize,

    /// random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// output file (plain or `.gz`)
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_sim(args: SimArgs) -> anyhow::Result<()> {
    init_logger(args.verbose);

    let model = MixtureModel::new(args.lambda0, args.r, args.s)?;
    info!("simulating {} p-values from {}", args.size, model);

    let mut rng = SmallRngGenerator::new(args.seed);
    let pvalues = sample_p_values(&model, args.size, &mut rng);

    write_lines(&pvalues, &args.out)?;
    info!("wrote {}", args.out);
    Ok(())
}
