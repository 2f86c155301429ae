//! Per-file throughput aggregation.
//!
//! A benchmark run is one CSV file. The first rows are warm-up and are
//! dropped; the remaining `throughput` values are averaged.

use crate::error::{AggregateError, AggregateResult};
use crate::models::{FileSummary, GroupKey, RawRecord, Variant};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

static RANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(\d+)range").expect("range pattern is valid"));

/// Extract the key-range size from a file name like `run-128range-1.csv`.
pub fn range_key(path: &Path) -> AggregateResult<GroupKey> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    RANGE_PATTERN
        .captures(&file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| GroupKey::new(m.as_str()))
        .ok_or_else(|| AggregateError::Pattern {
            path: path.to_path_buf(),
        })
}

fn required_columns(variant: Variant) -> &'static [&'static str] {
    match variant {
        Variant::Threads => &["name", "nthreads", "throughput"],
        Variant::Range => &["name", "throughput"],
    }
}

/// Whether two rows of one run disagree on the values the variant takes
/// from the last row. Range runs key on the file name, so their thread
/// column is never compared.
fn labels_differ(variant: Variant, prev: &RawRecord, record: &RawRecord) -> bool {
    match variant {
        Variant::Threads => prev.name != record.name || prev.nthreads != record.nthreads,
        Variant::Range => prev.name != record.name,
    }
}

/// Aggregate one benchmark file.
///
/// `name` and, for [`Variant::Threads`], the thread count come from the
/// last data row. A file whose rows disagree on either is still
/// aggregated, with a warning.
pub fn aggregate_file(
    path: &Path,
    variant: Variant,
    warmup_rows: usize,
) -> AggregateResult<FileSummary> {
    // Resolve the range key before touching the file; it only depends on the name.
    let range = match variant {
        Variant::Range => Some(range_key(path)?),
        Variant::Threads => None,
    };

    let file = File::open(path).map_err(|e| AggregateError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AggregateError::csv(path, e))?
        .clone();
    for column in required_columns(variant) {
        if !headers.iter().any(|h| h == *column) {
            return Err(AggregateError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut sum: i64 = 0;
    let mut rows_total = 0usize;
    let mut rows_used = 0usize;
    let mut last: Option<RawRecord> = None;
    let mut inconsistent = false;

    for (index, result) in reader.deserialize::<RawRecord>().enumerate() {
        let record: RawRecord = result.map_err(|e| AggregateError::csv(path, e))?;
        rows_total += 1;

        if index >= warmup_rows {
            let value: i64 = record.throughput.parse().map_err(|e: std::num::ParseIntError| {
                AggregateError::Parse {
                    path: path.to_path_buf(),
                    row: index + 1,
                    value: record.throughput.clone(),
                    message: e.to_string(),
                }
            })?;
            sum = sum.checked_add(value).ok_or_else(|| AggregateError::Parse {
                path: path.to_path_buf(),
                row: index + 1,
                value: record.throughput.clone(),
                message: "throughput sum overflows i64".to_string(),
            })?;
            rows_used += 1;
        }

        if let Some(ref prev) = last {
            if labels_differ(variant, prev, &record) {
                inconsistent = true;
            }
        }
        last = Some(record);
    }

    if rows_used == 0 {
        return Err(AggregateError::EmptyData {
            path: path.to_path_buf(),
            rows: rows_total,
            warmup_rows,
        });
    }

    if inconsistent {
        warn!(
            "{}: {} vary across rows; using values from the last row",
            path.display(),
            match variant {
                Variant::Threads => "name/nthreads",
                Variant::Range => "names",
            }
        );
    }

    // rows_used > 0 implies at least one record was read.
    let last = last.ok_or_else(|| AggregateError::EmptyData {
        path: path.to_path_buf(),
        rows: rows_total,
        warmup_rows,
    })?;

    let group_key = match range {
        Some(key) => key,
        None => GroupKey::new(last.nthreads.unwrap_or_default()),
    };

    let average = variant.average(sum, rows_used);
    debug!(
        "{}: {} @ {} = {} ({} of {} rows)",
        path.display(),
        last.name,
        group_key,
        average,
        rows_used,
        rows_total
    );

    Ok(FileSummary {
        path: path.to_path_buf(),
        name: last.name,
        group_key,
        average,
        rows_total,
        rows_used,
    })
}
