//! Directory-level pivot of benchmark summaries.
//!
//! Every CSV input in a directory is aggregated in file-name order and
//! folded into a [`PivotTable`], which is then written as one summary.

use crate::analysis::aggregator::aggregate_file;
use crate::error::{AggregateError, AggregateResult};
use crate::models::{Columns, FileSummary, PivotTable, Variant};
use crate::report::{self, OutputFormat};
use crate::scanner::{InputScanner, ScanConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Options for one pivot run.
#[derive(Debug, Clone)]
pub struct PivotOptions {
    /// Directory holding the per-run CSV files.
    pub dir: PathBuf,
    /// Summary file; its file name is excluded from the inputs.
    pub output: PathBuf,
    /// Pivot dimension and averaging policy.
    pub variant: Variant,
    /// Leading rows dropped from every file.
    pub warmup_rows: usize,
    /// Output column layout.
    pub columns: Columns,
    /// Summary file format.
    pub format: OutputFormat,
    /// Whether to show a progress bar.
    pub show_progress: bool,
}

impl PivotOptions {
    /// Defaults for `dir`: `<dir>/results.csv`, five warm-up rows, built-in columns.
    pub fn new(dir: impl Into<PathBuf>, variant: Variant) -> Self {
        let dir = dir.into();
        Self {
            output: dir.join(crate::config::DEFAULT_OUTPUT_FILE),
            dir,
            variant,
            warmup_rows: crate::models::DEFAULT_WARMUP_ROWS,
            columns: Columns::for_variant(variant),
            format: OutputFormat::Csv,
            show_progress: false,
        }
    }
}

/// Everything a pivot run produced.
#[derive(Debug, Clone)]
pub struct PivotOutcome {
    /// The pivoted averages.
    pub table: PivotTable,
    /// Per-file summaries, in processing order.
    pub summaries: Vec<FileSummary>,
    /// Labels present in the data but absent from the output columns.
    pub dropped_labels: Vec<String>,
}

/// Build the pivot table for a directory without writing anything.
pub fn pivot_directory(options: &PivotOptions) -> AggregateResult<PivotOutcome> {
    let scanner = InputScanner::new(
        options.dir.clone(),
        ScanConfig::excluding_output(&options.output),
    );
    let inputs = scanner.scan()?;

    if inputs.is_empty() {
        return Err(AggregateError::NoInputs {
            dir: options.dir.clone(),
        });
    }

    info!(
        "Aggregating {} files in {} (variant: {}, warm-up rows: {})",
        inputs.len(),
        options.dir.display(),
        options.variant,
        options.warmup_rows
    );

    let progress = if options.show_progress {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut table = PivotTable::new();
    let mut summaries = Vec::with_capacity(inputs.len());

    for input in &inputs {
        progress.set_message(input.name.clone());

        let summary = match aggregate_file(&input.path, options.variant, options.warmup_rows) {
            Ok(summary) => summary,
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        };

        if let Some(previous) = table.insert_summary(&summary) {
            warn!(
                "Duplicate result for {} @ {}: {} replaces {} ({})",
                summary.name,
                summary.group_key,
                summary.average,
                previous,
                input.name
            );
        }

        summaries.push(summary);
        progress.inc(1);
    }

    progress.finish_and_clear();

    let dropped_labels: Vec<String> = table
        .labels_outside(&options.columns.labels)
        .into_iter()
        .map(String::from)
        .collect();
    for label in &dropped_labels {
        debug!("Label {} has no output column; dropping it", label);
    }

    Ok(PivotOutcome {
        table,
        summaries,
        dropped_labels,
    })
}

/// Pivot a directory and write the summary file.
pub fn run(options: &PivotOptions) -> AggregateResult<PivotOutcome> {
    let outcome = pivot_directory(options)?;

    report::write_report(&outcome.table, &options.columns, options.format, &options.output)?;
    info!(
        "Wrote {} rows to {}",
        outcome.table.len(),
        options.output.display()
    );

    Ok(outcome)
}
