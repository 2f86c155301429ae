//! Summary rendering and output.

pub mod generator;

pub use generator::*;
