use dimstruct_clean::{
    outlier::{DEFAULT_QUANTILE_MULTIPLIER, OutlierTrimmer},
    skew::{DEFAULT_SKEW_THRESHOLD, SkewCorrector},
};

use crate::util::TableArgs;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SkewArg {
    #[clap(flatten)]
    table: TableArgs,
    /// Absolute skewness above which a column is transformed
    #[arg(long, default_value_t = DEFAULT_SKEW_THRESHOLD)]
    threshold: f64,
    /// Multiplier of the trimming band used to validate transforms
    #[arg(long, short = 'k', default_value_t = DEFAULT_QUANTILE_MULTIPLIER)]
    quantile_multiplier: f64,
    /// Treat these columns as positively skewed instead of computing the class
    #[arg(long, value_delimiter = ',')]
    positive: Option<Vec<String>>,
    /// Treat these columns as negatively skewed instead of computing the class
    #[arg(long, value_delimiter = ',')]
    negative: Option<Vec<String>>,
    /// Fail on columns with fewer than three observed values
    #[arg(long)]
    strict: bool,
}

pub(crate) fn run(arg: &SkewArg, verbose: bool) -> anyhow::Result<()> {
    let file = arg.table.read()?;
    let trimmer = OutlierTrimmer::new(arg.quantile_multiplier)?.strict(arg.strict);
    let corrector = SkewCorrector::new(arg.threshold)?
        .with_trimmer(trimmer)
        .with_override(arg.positive.clone(), arg.negative.clone())?
        .verbose(verbose);
    let (corrected, report) = corrector.correct(&file.table)?;
    arg.table.write(&file.index_name, &corrected)?;
    arg.table.write_report(&report)?;
    Ok(())
}
