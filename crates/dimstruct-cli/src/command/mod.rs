use clap::{Parser, Subcommand};

use self::{
    clean::CleanArg, patterns::PatternsArg, prune::PruneArg, select::SelectArg, skew::SkewArg,
    trim::TrimArg,
};

mod clean;
mod patterns;
mod prune;
mod select;
mod skew;
mod trim;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log every column-level decision (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run selection, skew correction and correlation pruning
    Clean(#[clap(flatten)] CleanArg),
    /// Replace values outside the quantile band with missing values
    Trim(#[clap(flatten)] TrimArg),
    /// Log-transform skewed columns, dropping failed transforms
    Skew(#[clap(flatten)] SkewArg),
    /// Drop columns by name pattern
    Select(#[clap(flatten)] SelectArg),
    /// Drop columns correlated with an earlier column of the same task
    Prune(#[clap(flatten)] PruneArg),
    /// List the curated default pattern groups and presets
    Patterns(#[clap(flatten)] PatternsArg),
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logger(args.verbose);
    match args.mode {
        Mode::Clean(arg) => clean::run(&arg, args.verbose)?,
        Mode::Trim(arg) => trim::run(&arg)?,
        Mode::Skew(arg) => skew::run(&arg, args.verbose)?,
        Mode::Select(arg) => select::run(&arg, args.verbose)?,
        Mode::Prune(arg) => prune::run(&arg, args.verbose)?,
        Mode::Patterns(arg) => patterns::run(&arg)?,
    }
    Ok(())
}
