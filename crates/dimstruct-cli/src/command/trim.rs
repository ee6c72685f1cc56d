use dimstruct_clean::outlier::{DEFAULT_QUANTILE_MULTIPLIER, OutlierTrimmer};

use crate::util::TableArgs;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrimArg {
    #[clap(flatten)]
    table: TableArgs,
    /// Band half-width in interquartile ranges around the median
    #[arg(long, short = 'k', default_value_t = DEFAULT_QUANTILE_MULTIPLIER)]
    quantile_multiplier: f64,
    /// Repeat trimming until a pass removes nothing
    #[arg(long)]
    until_stable: bool,
    /// Fail on columns with fewer than three observed values
    #[arg(long)]
    strict: bool,
}

pub(crate) fn run(arg: &TrimArg) -> anyhow::Result<()> {
    let file = arg.table.read()?;
    let trimmer = OutlierTrimmer::new(arg.quantile_multiplier)?.strict(arg.strict);
    let (trimmed, report) = if arg.until_stable {
        trimmer.trim_until_stable(&file.table)?
    } else {
        trimmer.trim(&file.table)?
    };
    log::info!(
        "replaced {} values outside the band with missing values",
        report.total_trimmed()
    );
    arg.table.write(&file.index_name, &trimmed)?;
    arg.table.write_report(&report)?;
    Ok(())
}
