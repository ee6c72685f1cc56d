use std::path::PathBuf;

use anyhow::Context;
use dimstruct_clean::{
    config::CleaningConfig,
    handoff::{DistanceMetric, RunId},
    patterns,
    pipeline::CleaningPipeline,
};

use crate::util::{Output, TableArgs, read_json_file, read_table_file};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CleanArg {
    #[clap(flatten)]
    table: TableArgs,
    /// JSON cleaning configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start from the drop and save lists of a named preset
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,
    #[arg(long, short = 'k')]
    quantile_multiplier: Option<f64>,
    #[arg(long)]
    skew_threshold: Option<f64>,
    #[arg(long)]
    correlation_threshold: Option<f64>,
    /// Drop columns matching this pattern [default: curated pattern groups]
    #[arg(long = "drop", value_name = "PATTERN")]
    drop_patterns: Vec<String>,
    /// Keep columns matching this pattern even if a drop pattern matches
    #[arg(long = "save", value_name = "PATTERN")]
    saved_patterns: Vec<String>,
    /// Fail on sparse columns and unmatched saved patterns
    #[arg(long)]
    strict: bool,
    /// Non-imputed variant of the input, cleaned with the decisions taken on the input
    #[arg(long)]
    unimputed: Option<PathBuf>,
    /// Output CSV path for the cleaned non-imputed table
    #[arg(long, requires = "unimputed")]
    unimputed_output: Option<PathBuf>,
    /// Write the factor-analysis handoff manifest to this path
    #[arg(long)]
    handoff: Option<PathBuf>,
    /// Distance metric recorded in the handoff manifest
    #[arg(long)]
    dist_metric: Option<DistanceMetric>,
    /// Bootstrap iterations recorded in the handoff manifest
    #[arg(long)]
    boot_iter: Option<usize>,
    /// Run identifier [default: random]
    #[arg(long)]
    run_id: Option<u16>,
    /// Fail when an adequacy gate rejects the cleaned table
    #[arg(long)]
    require_adequate: bool,
}

impl CleanArg {
    fn config(&self, verbose: bool) -> anyhow::Result<CleaningConfig> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => read_json_file("cleaning configuration", path)?,
            (None, Some(name)) => {
                let preset =
                    patterns::preset(name).with_context(|| format!("Unknown preset: {name}"))?;
                CleaningConfig::from_preset(preset)
            }
            (None, None) => CleaningConfig::default(),
        };
        if let Some(value) = self.quantile_multiplier {
            config.quantile_multiplier = value;
        }
        if let Some(value) = self.skew_threshold {
            config.skew_threshold = value;
        }
        if let Some(value) = self.correlation_threshold {
            config.correlation_threshold = value;
        }
        if !self.drop_patterns.is_empty() {
            config.drop_patterns.clone_from(&self.drop_patterns);
        }
        if !self.saved_patterns.is_empty() {
            config.saved_patterns.clone_from(&self.saved_patterns);
        }
        if let Some(value) = self.dist_metric {
            config.dist_metric = value;
        }
        if let Some(value) = self.boot_iter {
            config.boot_iter = value;
        }
        config.strict |= self.strict;
        config.verbose |= verbose;
        Ok(config)
    }
}

pub(crate) fn run(arg: &CleanArg, verbose: bool) -> anyhow::Result<()> {
    let config = arg.config(verbose)?;
    let pipeline = CleaningPipeline::from_config(&config)?;

    let file = arg.table.read()?;
    let cleaned = pipeline.run(&file.table)?;
    log::info!(
        "cleaned table has {} of {} columns",
        cleaned.table.n_columns(),
        file.table.n_columns()
    );
    if arg.require_adequate && !cleaned.is_adequate() {
        anyhow::bail!("Cleaned table failed the adequacy gates");
    }

    let unimputed = match &arg.unimputed {
        Some(path) => {
            let unimputed_file = read_table_file(path, Some(file.index_name.as_str()))?;
            let replayed = pipeline.replay(&cleaned, &unimputed_file.table)?;
            if let Some(output) = &arg.unimputed_output {
                Output::open(output.clone())?.write_table(&file.index_name, &replayed.table)?;
            }
            Some(replayed)
        }
        None => None,
    };

    arg.table.write(&file.index_name, &cleaned.table)?;
    arg.table.write_report(&cleaned.report)?;

    if let Some(path) = &arg.handoff {
        let run_id = arg.run_id.map_or_else(RunId::random, RunId);
        let handoff = pipeline.handoff(cleaned, unimputed, run_id)?;
        log::info!("handing off run {} to factor analysis", handoff.run_id);
        Output::save_json(&handoff.manifest(), Some(path.clone()))?;
    }
    Ok(())
}
