mod baseline;
mod config;
mod error;
mod export;
mod input;
mod manager;
mod metrics;
mod prob;
mod series;
mod stats;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Analyze {
        #[arg(long)]
        run_dir: PathBuf,
    },

    Clean {
        #[arg(long)]
        run_dir: PathBuf,
    },

    Prob {
        #[arg(long, allow_negative_numbers = true)]
        sigmas: f64,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    match args.command {
        Command::Analyze { run_dir } => {
            let mgr = Manager::new(run_dir).context("failed to construct mgr")?;
            mgr.run_analysis()?;
        }
        Command::Clean { run_dir } => {
            let mgr = Manager::new(run_dir).context("failed to construct mgr")?;
            mgr.clean_results()?;
        }
        Command::Prob { sigmas } => {
            let rarity = prob::estimate(sigmas).context("failed to estimate rarity")?;
            println!("{rarity}");
        }
    }

    Ok(())
}
