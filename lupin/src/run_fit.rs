use crate::common::*;

use clap::Parser;
use mixture_util::common_io::write_lines;
use mixture_util::histogram::{Histogram, DEFAULT_NUM_BINS};

#[derive(Parser, Debug, Clone)]
pub struct FitArgs {
    /// p-value file, one value per line (plain or `.gz`; `-` for stdin)
    pvalue_file: Box<str>,

    /// constrain the beta component to 0 < r < 1 and s > 1
    #[arg(long, default_value_t = false)]
    restricted: bool,

    /// retry with the restricted configuration if the default fit does
    /// not converge
    #[arg(long, default_value_t = false)]
    fallback_restricted: bool,

    /// number of histogram bins on [0, 1]
    #[arg(long, short, default_value_t = DEFAULT_NUM_BINS)]
    bins: usize,

    /// output header; writes `{out}.histogram.tsv` and `{out}.model.tsv`
    #[arg(long, short)]
    out: Option<Box<str>>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_fit(args: FitArgs) -> anyhow::Result<()> {
    init_logger(args.verbose);

    let pvalues = read_p_value_file(&args.pvalue_file)?;
    let estimate = fit_mixture_model(&pvalues, args.restricted, args.fallback_restricted)?;

    info!("fitted model:\n{}", estimate);
    println!(
        "lambda0\t{}\nr\t{}\ns\t{}",
        estimate.lambda0(),
        estimate.r(),
        estimate.s()
    );

    if let Some(out) = args.out.as_deref() {
        let model_file = format!("{}.model.tsv", out);
        let model_lines: Vec<Box<str>> = vec![
            "parameter\tvalue".into(),
            format!("lambda0\t{}", estimate.lambda0()).into(),
            format!("r\t{}", estimate.r()).into(),
            format!("s\t{}", estimate.s()).into(),
            format!("log_likelihood\t{}", estimate.log_likelihood()).into(),
            format!("iterations\t{}", estimate.iterations()).into(),
            format!("configuration\t{}", estimate.configuration()).into(),
            format!("num_p_values\t{}", estimate.num_p_values()).into(),
        ];
        write_lines(&model_lines, &model_file)?;

        let hist = Histogram::new(estimate.model(), estimate.sample(), args.bins)?;
        let hist_file = format!("{}.histogram.tsv", out);
        write_lines(&hist.to_tsv(), &hist_file)?;
        info!("wrote {} and {}", model_file, hist_file);
    }

    Ok(())
}
