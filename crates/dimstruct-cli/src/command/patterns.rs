use std::{io::Write as _, path::PathBuf};

use anyhow::Context;
use dimstruct_clean::patterns::{DEFAULT_PATTERN_GROUPS, DEFAULT_PATTERNS_VERSION, PRESETS};
use serde::Serialize;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PatternsArg {
    /// Print as JSON instead of plain text
    #[arg(long)]
    json: bool,
    /// Output file path [default: stdout]
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PatternTables {
    version: u32,
    groups: Vec<Group>,
    presets: Vec<Preset>,
}

#[derive(Debug, Serialize)]
struct Group {
    name: &'static str,
    description: &'static str,
    patterns: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct Preset {
    name: &'static str,
    drop: &'static [&'static str],
    saved: &'static [&'static str],
}

fn tables() -> PatternTables {
    PatternTables {
        version: DEFAULT_PATTERNS_VERSION,
        groups: DEFAULT_PATTERN_GROUPS
            .iter()
            .map(|g| Group {
                name: g.name,
                description: g.description,
                patterns: g.patterns,
            })
            .collect(),
        presets: PRESETS
            .iter()
            .map(|p| Preset {
                name: p.name,
                drop: p.drop,
                saved: p.saved,
            })
            .collect(),
    }
}

pub(crate) fn run(arg: &PatternsArg) -> anyhow::Result<()> {
    let tables = tables();
    let mut output = Output::from_output_path(arg.output.clone())?;
    if arg.json {
        return output.write_json(&tables);
    }

    let path = output.display_path();
    let mut write = || -> std::io::Result<()> {
        writeln!(output, "default pattern groups, version {}", tables.version)?;
        for group in &tables.groups {
            writeln!(output)?;
            writeln!(output, "{} ({})", group.name, group.description)?;
            for pattern in group.patterns {
                writeln!(output, "  {pattern}")?;
            }
        }
        for preset in &tables.presets {
            writeln!(output)?;
            writeln!(output, "preset {}", preset.name)?;
            writeln!(output, "  drop:  {}", preset.drop.join(", "))?;
            writeln!(output, "  saved: {}", preset.saved.join(", "))?;
        }
        output.flush()
    };
    write().with_context(|| format!("Failed to write pattern tables to {path}"))
}
