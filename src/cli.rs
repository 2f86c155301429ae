//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Variant;
use crate::report::OutputFormat;
use clap::Parser;
use std::path::{Path, PathBuf};

/// BenchPivot - summarize concurrent data-structure benchmark runs
///
/// Averages the steady-state throughput of every CSV run in a directory
/// and pivots the results into one table keyed by thread count or
/// key-range size.
///
/// Examples:
///   benchpivot results/threads
///   benchpivot results/range_preformance --variant range
///   benchpivot results/threads --format markdown -o summary.md
///   benchpivot results/threads --dry-run
///   benchpivot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory containing the per-run CSV files
    #[arg(value_name = "DIR", required_unless_present = "init_config")]
    pub dir: Option<PathBuf>,

    /// Pivot dimension: thread count column or key range from file name
    #[arg(long, default_value = "threads", env = "BENCHPIVOT_VARIANT")]
    pub variant: Variant,

    /// Output file path (default: <DIR>/results.csv, .json or .md per --format)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (csv, json, markdown)
    #[arg(long, default_value = "csv", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Number of leading warm-up rows to drop from each run
    #[arg(long, value_name = "ROWS")]
    pub warmup_rows: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .benchpivot.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List the files that would be aggregated and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .benchpivot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Input directory; empty if unset (only with --init-config).
    pub fn input_dir(&self) -> &Path {
        self.dir.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Output path: explicit `--output`, else `<DIR>/<output_file>` with the
    /// extension of the chosen format.
    pub fn output_path(&self, output_file: &str) -> PathBuf {
        match self.output {
            Some(ref path) => path.clone(),
            None => self
                .input_dir()
                .join(self.format.output_file_name(output_file)),
        }
    }

    /// Validate the parsed arguments.
    ///
    /// The input directory itself is checked by the scanner, which reports
    /// a missing or non-directory path as an I/O error.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.dir.is_none() {
            return Err("Missing input directory".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_args(dir: &Path) -> Args {
        Args {
            dir: Some(dir.to_path_buf()),
            variant: Variant::Threads,
            output: None,
            format: OutputFormat::Csv,
            warmup_rows: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_positional_dir() {
        let args = Args::try_parse_from(["benchpivot", "runs", "--variant", "range"]).unwrap();
        assert_eq!(args.dir, Some(PathBuf::from("runs")));
        assert_eq!(args.variant, Variant::Range);
        assert_eq!(args.format, OutputFormat::Csv);
        assert_eq!(args.output_path("results.csv"), PathBuf::from("runs/results.csv"));
    }

    #[test]
    fn test_dir_required() {
        assert!(Args::try_parse_from(["benchpivot"]).is_err());
        assert!(Args::try_parse_from(["benchpivot", "--init-config"]).is_ok());
    }

    #[test]
    fn test_explicit_output() {
        let args = Args::try_parse_from(["benchpivot", "runs", "-o", "out/summary.csv"]).unwrap();
        assert_eq!(args.output_path("results.csv"), PathBuf::from("out/summary.csv"));
    }

    #[test]
    fn test_default_output_follows_format() {
        let args = Args::try_parse_from(["benchpivot", "runs", "--format", "json"]).unwrap();
        assert_eq!(args.output_path("results.csv"), PathBuf::from("runs/results.json"));

        let args = Args::try_parse_from(["benchpivot", "runs", "--format", "markdown"]).unwrap();
        assert_eq!(args.output_path("results.csv"), PathBuf::from("runs/results.md"));

        let args =
            Args::try_parse_from(["benchpivot", "runs", "--format", "json", "-o", "out.txt"]).unwrap();
        assert_eq!(args.output_path("results.csv"), PathBuf::from("out.txt"));
    }

    #[test]
    fn test_validation_leaves_directory_to_scanner() {
        let tmp = TempDir::new().unwrap();
        let args = make_args(&tmp.path().join("nope"));
        assert!(args.validate().is_ok());

        let mut args = make_args(tmp.path());
        args.dir = None;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let tmp = TempDir::new().unwrap();
        let mut args = make_args(tmp.path());
        assert!(args.validate().is_ok());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let tmp = TempDir::new().unwrap();
        let mut args = make_args(tmp.path());
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
