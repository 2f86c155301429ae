//! Error types for benchmark aggregation.
//!
//! Every variant names the file it concerns so the CLI can report the
//! offending input without extra context. Underlying I/O, CSV, and JSON
//! errors are kept as the error source.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning, aggregating, or writing results.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Path missing, unreadable, or not writable.
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content.
    #[error("Malformed CSV in {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required header column is absent.
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// Throughput value is not an integer.
    #[error("Parse error in {path}, data row {row}: {message} (value '{value}')")]
    Parse {
        path: PathBuf,
        row: usize,
        value: String,
        message: String,
    },

    /// Not enough rows left after dropping the warm-up rows.
    #[error("Empty data in {path}: {rows} data rows, need more than {warmup_rows}")]
    EmptyData {
        path: PathBuf,
        rows: usize,
        warmup_rows: usize,
    },

    /// File name does not carry a `-<N>range` marker.
    #[error("Pattern error: file name {path} does not match '-<N>range'")]
    Pattern { path: PathBuf },

    /// Summary could not be serialized.
    #[error("Failed to render JSON for {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No CSV inputs were found in the directory.
    #[error("No CSV input files found in {dir}")]
    NoInputs { dir: PathBuf },
}

impl AggregateError {
    /// Short name of the error kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            AggregateError::Io { .. } => "IOError",
            AggregateError::Csv { .. } => "CsvError",
            AggregateError::MissingColumn { .. } => "ParseError",
            AggregateError::Parse { .. } => "ParseError",
            AggregateError::EmptyData { .. } => "EmptyDataError",
            AggregateError::Pattern { .. } => "PatternError",
            AggregateError::Json { .. } => "IOError",
            AggregateError::NoInputs { .. } => "IOError",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AggregateError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        AggregateError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Result type for aggregation operations.
pub type AggregateResult<T> = Result<T, AggregateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_file() {
        let err = AggregateError::EmptyData {
            path: PathBuf::from("runs/bst-4.csv"),
            rows: 3,
            warmup_rows: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("runs/bst-4.csv"));
        assert!(msg.contains("3 data rows"));
        assert_eq!(err.kind(), "EmptyDataError");
    }

    #[test]
    fn test_parse_error_format() {
        let err = AggregateError::Parse {
            path: PathBuf::from("avl.csv"),
            row: 7,
            value: "fast".into(),
            message: "invalid digit found in string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("data row 7"));
        assert!(msg.contains("'fast'"));
        assert_eq!(err.kind(), "ParseError");
    }

    #[test]
    fn test_into_anyhow() {
        let err: anyhow::Error = AggregateError::Pattern {
            path: PathBuf::from("run.csv"),
        }
        .into();
        assert!(err.to_string().contains("-<N>range"));
    }
}
