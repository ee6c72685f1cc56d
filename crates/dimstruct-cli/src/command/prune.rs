use dimstruct_clean::prune::{CorrelationPruner, DEFAULT_CORRELATION_THRESHOLD};

use crate::util::TableArgs;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PruneArg {
    #[clap(flatten)]
    table: TableArgs,
    /// Absolute correlation at which a later column of the same task is removed
    #[arg(long, default_value_t = DEFAULT_CORRELATION_THRESHOLD)]
    threshold: f64,
}

pub(crate) fn run(arg: &PruneArg, verbose: bool) -> anyhow::Result<()> {
    let file = arg.table.read()?;
    let pruner = CorrelationPruner::new(arg.threshold)?.verbose(verbose);
    let (pruned, report) = pruner.prune(&file.table)?;
    arg.table.write(&file.index_name, &pruned)?;
    arg.table.write_report(&report)?;
    Ok(())
}
