use anyhow::Context;
use dimstruct_clean::{patterns, select::VariableSelector};

use crate::util::TableArgs;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SelectArg {
    #[clap(flatten)]
    table: TableArgs,
    /// Drop columns matching this pattern [default: curated pattern groups]
    #[arg(long = "drop", value_name = "PATTERN")]
    drop_patterns: Vec<String>,
    /// Keep columns matching this pattern even if a drop pattern matches
    #[arg(long = "save", value_name = "PATTERN")]
    saved_patterns: Vec<String>,
    /// Use the drop and save lists of a named preset
    #[arg(long, conflicts_with_all = ["drop_patterns", "saved_patterns"])]
    preset: Option<String>,
    /// Fail when a saved pattern matches no column
    #[arg(long)]
    strict: bool,
}

pub(crate) fn run(arg: &SelectArg, verbose: bool) -> anyhow::Result<()> {
    let file = arg.table.read()?;
    let selector = match &arg.preset {
        Some(name) => {
            let preset = patterns::preset(name).with_context(|| format!("Unknown preset: {name}"))?;
            VariableSelector::from_patterns(preset.drop, preset.saved)?
        }
        None => VariableSelector::from_patterns(&arg.drop_patterns, &arg.saved_patterns)?,
    }
    .strict(arg.strict)
    .verbose(verbose);
    let (selected, report) = selector.select(&file.table)?;
    arg.table.write(&file.index_name, &selected)?;
    arg.table.write_report(&report)?;
    Ok(())
}
