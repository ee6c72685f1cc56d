use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    iter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use dimstruct_clean::table::{Column, NumericTable, parse_cell};

/// Input and output locations shared by the table-transforming commands.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TableArgs {
    /// Input CSV table, one row per subject
    input: PathBuf,
    /// Name of the row-identifier column [default: first column]
    #[arg(long)]
    index_column: Option<String>,
    /// Output CSV path [default: stdout]
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Write the JSON report of the decisions taken to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl TableArgs {
    pub fn read(&self) -> anyhow::Result<TableFile> {
        read_table_file(&self.input, self.index_column.as_deref())
    }

    pub fn write(&self, index_name: &str, table: &NumericTable) -> anyhow::Result<()> {
        let mut output = Output::from_output_path(self.output.clone())?;
        output.write_table(index_name, table)
    }

    pub fn write_report<T>(&self, report: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        match &self.report {
            Some(path) => Output::save_json(report, Some(path.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }

    /// Writes `table` as CSV with the row identifiers in the first column.
    ///
    /// Missing values are written as empty cells.
    pub fn write_table(&mut self, index_name: &str, table: &NumericTable) -> anyhow::Result<()> {
        let display_path = self.display_path();
        let mut writer = csv::Writer::from_writer(&mut *self);
        writer
            .write_record(iter::once(index_name).chain(table.column_names()))
            .with_context(|| format!("Failed to write CSV header to {display_path}"))?;
        for (row, id) in table.index().iter().enumerate() {
            let record = iter::once(id.clone()).chain(
                table
                    .columns()
                    .iter()
                    .map(|column| column.values()[row].map_or_else(String::new, |v| v.to_string())),
            );
            writer
                .write_record(record)
                .with_context(|| format!("Failed to write row '{id}' to {display_path}"))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {display_path}"))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// A table read from disk, with the header of its row-identifier column.
#[derive(Debug, Clone)]
pub struct TableFile {
    pub index_name: String,
    pub table: NumericTable,
}

/// Reads a CSV table whose cells are numbers or missing-value tokens.
///
/// The row-identifier column is `index_column`, or the first column when
/// `None`. Every other column must be numeric.
pub fn read_table_file<P>(path: P, index_column: Option<&str>) -> anyhow::Result<TableFile>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open table file: {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header of {}", path.display()))?
        .iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    let index_position = match index_column {
        Some(name) => headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Index column '{name}' not found in {}", path.display()))?,
        None if headers.is_empty() => {
            anyhow::bail!("Table file has no columns: {}", path.display())
        }
        None => 0,
    };

    let mut index = vec![];
    let mut values = vec![vec![]; headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| {
            format!("Failed to read record {} of {}", line + 1, path.display())
        })?;
        let id = record.get(index_position).unwrap_or_default().to_owned();
        for (position, raw) in record.iter().enumerate() {
            if position == index_position {
                continue;
            }
            let cell = parse_cell(&headers[position], &id, raw)
                .with_context(|| format!("Invalid table file: {}", path.display()))?;
            values[position].push(cell);
        }
        index.push(id);
    }

    let columns = headers
        .iter()
        .zip(values)
        .enumerate()
        .filter(|(position, _)| *position != index_position)
        .map(|(_, (name, values))| Column::new(name.as_str(), values))
        .collect();
    let table = NumericTable::new(index, columns)
        .with_context(|| format!("Invalid table file: {}", path.display()))?;
    log::info!(
        "read {} rows and {} columns from {}",
        table.n_rows(),
        table.n_columns(),
        path.display()
    );

    Ok(TableFile {
        index_name: headers[index_position].clone(),
        table,
    })
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::*;

    #[test]
    fn test_read_table_file() {
        let path = env::temp_dir().join(format!("dimstruct-read-{}.csv", std::process::id()));
        fs::write(
            &path,
            "stroop.rt,subject,stroop.acc\n510,s1,0.9\nNA,s2,\n480.5,s3,0.8\n",
        )
        .unwrap();
        let file = read_table_file(&path, Some("subject")).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(file.index_name, "subject");
        assert_eq!(file.table.index(), ["s1", "s2", "s3"]);
        assert_eq!(
            file.table.column_names().collect::<Vec<_>>(),
            ["stroop.rt", "stroop.acc"]
        );
        assert_eq!(file.table.get("s2", "stroop.rt"), None);
        assert_eq!(file.table.get("s3", "stroop.rt"), Some(480.5));
    }

    #[test]
    fn test_non_numeric_cell_rejected() {
        let path = env::temp_dir().join(format!("dimstruct-bad-{}.csv", std::process::id()));
        fs::write(&path, ",stroop.rt\ns1,fast\n").unwrap();
        let result = read_table_file(&path, None);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
