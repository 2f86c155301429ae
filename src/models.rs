//! Data models for benchmark aggregation.
//!
//! This module contains the core data structures shared by the
//! aggregator, the pivot, and the report writers.

use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Number of leading rows treated as warm-up and excluded from averages.
pub const DEFAULT_WARMUP_ROWS: usize = 5;

/// Data structures benchmarked against thread counts.
pub const THREAD_LABELS: &[&str] = &["BLTree", "ConcurrentHMAP", "BST", "AVL", "Snap", "SkipList"];

/// Data structures benchmarked against key-range sizes.
pub const RANGE_LABELS: &[&str] = &["BLTree", "BST", "AVL", "Snap", "SkipList", "SyncTMAP"];

/// Which dimension the results are pivoted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Variant {
    /// Group by the `nthreads` column; integer averages.
    #[default]
    Threads,
    /// Group by the `-<N>range` marker in the file name; float averages.
    Range,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Threads => write!(f, "threads"),
            Variant::Range => write!(f, "range"),
        }
    }
}

impl Variant {
    /// Header of the grouping-key column in the output.
    pub fn key_column(&self) -> &'static str {
        match self {
            Variant::Threads => "threads",
            Variant::Range => "range",
        }
    }

    /// Built-in label columns, in output order.
    pub fn default_labels(&self) -> &'static [&'static str] {
        match self {
            Variant::Threads => THREAD_LABELS,
            Variant::Range => RANGE_LABELS,
        }
    }

    /// Compute the average of `sum` over `count` rows under this variant's policy.
    ///
    /// `threads` truncates toward zero; `range` keeps the fraction.
    pub fn average(&self, sum: i64, count: usize) -> Average {
        match self {
            Variant::Threads => Average::Integer(sum / count as i64),
            Variant::Range => Average::Float(sum as f64 / count as f64),
        }
    }
}

/// One CSV row of a benchmark run. Extra columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// Data structure under test.
    pub name: String,
    /// Thread count, only present in thread-scaling runs.
    #[serde(default)]
    pub nthreads: Option<String>,
    /// Raw throughput cell, parsed by the aggregator so errors can name the row.
    pub throughput: String,
}

/// Steady-state average throughput.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Average {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Average::Integer(v) => write!(f, "{}", v),
            // Whole floats keep one fractional digit: 100.0, not 100.
            Average::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Average::Float(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Average {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Average::Integer(v) => serializer.serialize_i64(*v),
            Average::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

/// Pivot dimension value: a thread count or a key-range size.
///
/// Unsigned integer keys order numerically and come before any
/// non-numeric key; the rest order lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of aggregating a single benchmark file.
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// File the summary was computed from.
    pub path: PathBuf,
    /// Data structure label (from the last row).
    pub name: String,
    /// Pivot key.
    pub group_key: GroupKey,
    /// Mean throughput after the warm-up rows.
    pub average: Average,
    /// Data rows in the file, excluding the header.
    pub rows_total: usize,
    /// Rows that contributed to the average.
    pub rows_used: usize,
}

/// Group key -> label -> average, iterated in key order.
#[derive(Debug, Clone, Default)]
pub struct PivotTable {
    rows: BTreeMap<GroupKey, BTreeMap<String, Average>>,
}

impl PivotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one cell. Returns the previous average for the same
    /// `(group_key, label)` pair, which the new value replaces.
    pub fn insert(&mut self, group_key: GroupKey, label: String, average: Average) -> Option<Average> {
        self.rows.entry(group_key).or_default().insert(label, average)
    }

    /// Record a file summary.
    pub fn insert_summary(&mut self, summary: &FileSummary) -> Option<Average> {
        self.insert(
            summary.group_key.clone(),
            summary.name.clone(),
            summary.average,
        )
    }

    pub fn get(&self, group_key: &GroupKey, label: &str) -> Option<Average> {
        self.rows.get(group_key).and_then(|cells| cells.get(label)).copied()
    }

    /// Rows in group-key order.
    pub fn rows(&self) -> impl Iterator<Item = (&GroupKey, &BTreeMap<String, Average>)> {
        self.rows.iter()
    }

    /// Labels present in the table that are not among `columns`.
    pub fn labels_outside<'a>(&'a self, columns: &[String]) -> Vec<&'a str> {
        let mut extra: Vec<&str> = self
            .rows
            .values()
            .flat_map(|cells| cells.keys())
            .map(String::as_str)
            .filter(|label| !columns.iter().any(|c| c == label))
            .collect();
        extra.sort_unstable();
        extra.dedup();
        extra
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Output columns for one run: the key header plus the label headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub key: String,
    pub labels: Vec<String>,
}

impl Columns {
    /// Built-in columns for a variant.
    pub fn for_variant(variant: Variant) -> Self {
        Self::with_labels(variant, variant.default_labels().iter().map(|s| s.to_string()).collect())
    }

    pub fn with_labels(variant: Variant, labels: Vec<String>) -> Self {
        Self {
            key: variant.key_column().to_string(),
            labels,
        }
    }

    /// Full header row.
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(self.key.as_str())
            .chain(self.labels.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_average_policy() {
        assert_eq!(Variant::Threads.average(301, 2), Average::Integer(150));
        assert_eq!(Variant::Range.average(301, 2), Average::Float(150.5));
    }

    #[test]
    fn test_average_display() {
        assert_eq!(Average::Integer(100).to_string(), "100");
        assert_eq!(Average::Float(100.0).to_string(), "100.0");
        assert_eq!(Average::Float(12.5).to_string(), "12.5");
    }

    #[test]
    fn test_group_key_ordering() {
        let mut keys = vec![
            GroupKey::new("16"),
            GroupKey::new("abc"),
            GroupKey::new("2"),
            GroupKey::new("128"),
        ];
        keys.sort();
        let ordered: Vec<&str> = keys.iter().map(GroupKey::as_str).collect();
        assert_eq!(ordered, vec!["2", "16", "128", "abc"]);
    }

    #[test]
    fn test_pivot_last_write_wins() {
        let mut table = PivotTable::new();
        let key = GroupKey::new("4");
        assert!(table.insert(key.clone(), "AVL".into(), Average::Integer(1)).is_none());
        let previous = table.insert(key.clone(), "AVL".into(), Average::Integer(2));
        assert_eq!(previous, Some(Average::Integer(1)));
        assert_eq!(table.get(&key, "AVL"), Some(Average::Integer(2)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_labels_outside() {
        let mut table = PivotTable::new();
        table.insert(GroupKey::new("1"), "AVL".into(), Average::Integer(1));
        table.insert(GroupKey::new("1"), "KSTRQ".into(), Average::Integer(1));
        table.insert(GroupKey::new("2"), "KSTRQ".into(), Average::Integer(1));

        let columns = Columns::for_variant(Variant::Threads);
        assert_eq!(table.labels_outside(&columns.labels), vec!["KSTRQ"]);
    }

    #[test]
    fn test_columns_header() {
        let columns = Columns::for_variant(Variant::Range);
        assert_eq!(
            columns.header(),
            vec!["range", "BLTree", "BST", "AVL", "Snap", "SkipList", "SyncTMAP"]
        );
    }
}
