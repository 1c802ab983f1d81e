mod common;
mod run_fit;
mod run_power;
mod run_sim;

use crate::run_fit::*;
use crate::run_power::*;
use crate::run_sim::*;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fit a uniform + beta mixture model to a list of p-values
    Fit(FitArgs),

    /// Project TP, TN and EDR onto other sample sizes and thresholds
    Power(PowerArgs),

    /// Simulate p-values from a mixture model
    Simulate(SimArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Fit(args) => {
            run_fit(args.clone())?;
        }
        Commands::Power(args) => {
            run_power(args.clone())?;
        }
        Commands::Simulate(args) => {
            run_sim(args.clone())?;
        }
    }

    Ok(())
}
