//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.benchpivot.toml` files.

use crate::models::{Columns, Variant, DEFAULT_WARMUP_ROWS, RANGE_LABELS, THREAD_LABELS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the summary file written into the input directory.
pub const DEFAULT_OUTPUT_FILE: &str = "results.csv";

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".benchpivot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Averaging settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Output label columns per variant.
    #[serde(default)]
    pub columns: ColumnsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file name, created inside the input directory.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            verbose: false,
        }
    }
}

fn default_output_file() -> String {
    DEFAULT_OUTPUT_FILE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Leading rows of each run excluded from the average.
    #[serde(default = "default_warmup_rows")]
    pub warmup_rows: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            warmup_rows: default_warmup_rows(),
        }
    }
}

fn default_warmup_rows() -> usize {
    DEFAULT_WARMUP_ROWS
}

/// Label columns written after the grouping-key column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_thread_labels")]
    pub threads: Vec<String>,

    #[serde(default = "default_range_labels")]
    pub range: Vec<String>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            threads: default_thread_labels(),
            range: default_range_labels(),
        }
    }
}

fn default_thread_labels() -> Vec<String> {
    THREAD_LABELS.iter().map(|s| s.to_string()).collect()
}

fn default_range_labels() -> Vec<String> {
    RANGE_LABELS.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the current directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(warmup) = args.warmup_rows {
            self.aggregation.warmup_rows = warmup;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Output columns for the given variant.
    pub fn columns(&self, variant: Variant) -> Columns {
        let labels = match variant {
            Variant::Threads => self.columns.threads.clone(),
            Variant::Range => self.columns.range.clone(),
        };
        Columns::with_labels(variant, labels)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output_file, "results.csv");
        assert_eq!(config.aggregation.warmup_rows, 5);
        assert_eq!(config.columns.threads[1], "ConcurrentHMAP");
        assert_eq!(config.columns.range.last().map(String::as_str), Some("SyncTMAP"));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_file = "summary.csv"

[aggregation]
warmup_rows = 10

[columns]
threads = ["BLTree", "KSTRQ"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_file, "summary.csv");
        assert!(!config.general.verbose);
        assert_eq!(config.aggregation.warmup_rows, 10);
        assert_eq!(config.columns.threads, vec!["BLTree", "KSTRQ"]);
        assert_eq!(config.columns.range, default_range_labels());

        let columns = config.columns(Variant::Threads);
        assert_eq!(columns.header(), vec!["threads", "BLTree", "KSTRQ"]);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[aggregation]"));
        assert!(toml_str.contains("[columns]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.aggregation.warmup_rows, 5);
    }
}
