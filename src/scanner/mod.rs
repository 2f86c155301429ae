//! Input discovery for a benchmark results directory.
//!
//! Only the top level of the directory is listed. Files are returned
//! sorted by name so that runs are reproducible across platforms.

use crate::error::{AggregateError, AggregateResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for input scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File name suffix an input must carry (e.g. ".csv").
    pub suffix: String,
    /// File names to skip, normally the output file.
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            suffix: ".csv".to_string(),
            exclude: vec![crate::config::DEFAULT_OUTPUT_FILE.to_string()],
        }
    }
}

impl ScanConfig {
    /// Scan for CSV files, skipping the file that `output` points to and
    /// the CSV summary of the same name (`results.json` also skips
    /// `results.csv`).
    pub fn excluding_output(output: &Path) -> Self {
        let mut exclude = Vec::new();
        if let Some(name) = output.file_name() {
            exclude.push(name.to_string_lossy().to_string());
        }
        if let Some(stem) = output.file_stem() {
            let sibling = format!("{}.csv", stem.to_string_lossy());
            if !exclude.contains(&sibling) {
                exclude.push(sibling);
            }
        }

        Self {
            exclude,
            ..Self::default()
        }
    }
}

/// A benchmark file selected for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File name within the scanned directory.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
}

/// Lists benchmark inputs of one directory.
pub struct InputScanner {
    config: ScanConfig,
    dir: PathBuf,
}

impl InputScanner {
    pub fn new(dir: PathBuf, config: ScanConfig) -> Self {
        Self { config, dir }
    }

    /// Scan the directory for matching files, sorted by file name.
    pub fn scan(&self) -> AggregateResult<Vec<InputFile>> {
        let metadata = fs::metadata(&self.dir).map_err(|e| AggregateError::io(&self.dir, e))?;
        if !metadata.is_dir() {
            return Err(AggregateError::io(
                &self.dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        let mut files = Vec::new();

        let walker = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.dir.clone());
                AggregateError::io(path, std::io::Error::from(e))
            })?;

            let name = entry.file_name().to_string_lossy().to_string();

            if !entry.file_type().is_file() {
                debug!("Skipping non-file entry {}", name);
                continue;
            }

            if !self.matches(&name) {
                debug!("Skipping {}", name);
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(InputFile {
                name,
                path: entry.into_path(),
                size,
            });
        }

        Ok(files)
    }

    /// Check if a file name qualifies as an input.
    pub fn matches(&self, name: &str) -> bool {
        if !name.ends_with(&self.config.suffix) {
            return false;
        }

        !self.config.exclude.iter().any(|excluded| excluded == name)
    }
}
