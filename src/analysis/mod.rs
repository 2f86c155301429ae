//! Benchmark analysis: per-file averages and the directory pivot.

pub mod aggregator;
pub mod pivot;

pub use pivot::*;
