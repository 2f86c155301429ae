//! Summary report generation.
//!
//! The CSV layout is the canonical output: one row per group key, the key
//! column first, then one column per known label. JSON and Markdown
//! renderings carry the same cells.

use crate::error::{AggregateError, AggregateResult};
use crate::models::{Average, Columns, GroupKey, PivotTable};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output format for the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pivoted CSV (default)
    #[default]
    Csv,
    /// JSON array, one object per group key
    Json,
    /// Markdown table
    Markdown,
}

impl OutputFormat {
    /// File extension used for default output names.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }

    /// Default output file name for this format: `results.csv` becomes
    /// `results.json` or `results.md`.
    pub fn output_file_name(&self, file_name: &str) -> String {
        match self {
            OutputFormat::Csv => file_name.to_string(),
            _ => Path::new(file_name)
                .with_extension(self.extension())
                .to_string_lossy()
                .into_owned(),
        }
    }
}

/// Cells of one output row, aligned with `columns.labels`.
fn row_cells(table: &PivotTable, columns: &Columns) -> Vec<(String, Vec<Option<String>>)> {
    table
        .rows()
        .map(|(key, _)| {
            let values = columns
                .labels
                .iter()
                .map(|label| table.get(key, label).map(|avg| avg.to_string()))
                .collect();
            (key.to_string(), values)
        })
        .collect()
}

/// Write the pivot as CSV. Missing cells are written empty.
pub fn write_csv<W: Write>(table: &PivotTable, columns: &Columns, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns.header())?;

    for (key, values) in row_cells(table, columns) {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(key);
        record.extend(values.into_iter().map(Option::unwrap_or_default));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// One JSON object: the key column, then the labels in column order.
struct JsonRow<'a> {
    columns: &'a Columns,
    key: &'a GroupKey,
    cells: Vec<Option<Average>>,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 1))?;
        map.serialize_entry(&self.columns.key, self.key.as_str())?;
        for (label, cell) in self.columns.labels.iter().zip(&self.cells) {
            map.serialize_entry(label, cell)?;
        }
        map.end()
    }
}

/// Render the pivot as a JSON array. Missing cells are `null`.
pub fn generate_json_report(table: &PivotTable, columns: &Columns) -> serde_json::Result<String> {
    let rows: Vec<JsonRow> = table
        .rows()
        .map(|(key, _)| JsonRow {
            columns,
            key,
            cells: columns
                .labels
                .iter()
                .map(|label| table.get(key, label))
                .collect(),
        })
        .collect();

    serde_json::to_string_pretty(&rows)
}

/// Render the pivot as a Markdown table.
pub fn generate_markdown_report(table: &PivotTable, columns: &Columns) -> String {
    let header = columns.header();
    let mut output = String::new();

    output.push_str(&format!("| {} |\n", header.join(" | ")));
    output.push_str(&format!("|{}\n", "---:|".repeat(header.len())));

    for (key, values) in row_cells(table, columns) {
        let cells: Vec<String> = values.into_iter().map(Option::unwrap_or_default).collect();
        if cells.is_empty() {
            output.push_str(&format!("| {} |\n", key));
        } else {
            output.push_str(&format!("| {} | {} |\n", key, cells.join(" | ")));
        }
    }

    output
}

/// Write the summary in the chosen format, creating or truncating `path`.
pub fn write_report(
    table: &PivotTable,
    columns: &Columns,
    format: OutputFormat,
    path: &Path,
) -> AggregateResult<()> {
    let mut file = File::create(path).map_err(|e| AggregateError::io(path, e))?;

    match format {
        OutputFormat::Csv => {
            write_csv(table, columns, &mut file).map_err(|e| AggregateError::csv(path, e))?;
        }
        OutputFormat::Json => {
            let json = generate_json_report(table, columns).map_err(|e| AggregateError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
            file.write_all(json.as_bytes())
                .map_err(|e| AggregateError::io(path, e))?;
        }
        OutputFormat::Markdown => {
            let markdown = generate_markdown_report(table, columns);
            file.write_all(markdown.as_bytes())
                .map_err(|e| AggregateError::io(path, e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Variant;
    use serde_json::Value;
    use tempfile::TempDir;

    fn create_test_table() -> PivotTable {
        let mut table = PivotTable::new();
        table.insert(GroupKey::new("8"), "BST".into(), Average::Integer(420));
        table.insert(GroupKey::new("2"), "BLTree".into(), Average::Integer(100));
        table.insert(GroupKey::new("2"), "SkipList".into(), Average::Integer(80));
        table
    }

    #[test]
    fn test_write_csv() {
        let table = create_test_table();
        let columns = Columns::for_variant(Variant::Threads);

        let mut buf = Vec::new();
        write_csv(&table, &columns, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "threads,BLTree,ConcurrentHMAP,BST,AVL,Snap,SkipList\n\
             2,100,,,,,80\n\
             8,,,420,,,\n"
        );
    }

    #[test]
    fn test_generate_json_report() {
        let table = create_test_table();
        let columns = Columns::for_variant(Variant::Threads);

        let json = generate_json_report(&table, &columns).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["threads"], "2");
        assert_eq!(parsed[0]["BLTree"], 100);
        assert!(parsed[0]["AVL"].is_null());
        assert_eq!(parsed[1]["BST"], 420);
    }

    #[test]
    fn test_json_keys_follow_column_order() {
        let mut table = PivotTable::new();
        table.insert(GroupKey::new("128"), "SyncTMAP".into(), Average::Float(3.5));
        table.insert(GroupKey::new("128"), "AVL".into(), Average::Float(1.0));
        let columns = Columns::for_variant(Variant::Range);

        let json = generate_json_report(&table, &columns).unwrap();
        let positions: Vec<usize> = columns
            .header()
            .iter()
            .map(|name| json.find(&format!("\"{}\"", name)).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        assert!(json.contains("\"range\": \"128\""));
        assert!(json.contains("\"AVL\": 1.0"));
    }

    #[test]
    fn test_output_file_name_per_format() {
        assert_eq!(OutputFormat::Csv.output_file_name("results.csv"), "results.csv");
        assert_eq!(OutputFormat::Json.output_file_name("results.csv"), "results.json");
        assert_eq!(OutputFormat::Markdown.output_file_name("results.csv"), "results.md");
        assert_eq!(OutputFormat::Json.output_file_name("summary"), "summary.json");
    }

    #[test]
    fn test_generate_markdown_report() {
        let mut table = PivotTable::new();
        table.insert(GroupKey::new("64"), "AVL".into(), Average::Float(12.5));
        let columns = Columns::for_variant(Variant::Range);

        let md = generate_markdown_report(&table, &columns);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| range | BLTree | BST | AVL | Snap | SkipList | SyncTMAP |");
        assert_eq!(lines[1], "|---:|---:|---:|---:|---:|---:|---:|");
        assert_eq!(lines[2], "| 64 |  |  | 12.5 |  |  |  |");
    }

    #[test]
    fn test_write_report_truncates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.csv");
        std::fs::write(&path, "stale content that is longer than the report\n".repeat(10)).unwrap();

        let columns = Columns::for_variant(Variant::Threads);
        write_report(&PivotTable::new(), &columns, OutputFormat::Csv, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "threads,BLTree,ConcurrentHMAP,BST,AVL,Snap,SkipList\n");
    }

    #[test]
    fn test_write_report_unwritable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("results.csv");
        let columns = Columns::for_variant(Variant::Threads);

        let err = write_report(&PivotTable::new(), &columns, OutputFormat::Csv, &path).unwrap_err();
        assert!(matches!(err, AggregateError::Io { .. }));
    }
}
