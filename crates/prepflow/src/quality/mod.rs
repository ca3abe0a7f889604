//! Dataset quality analysis.

mod analyzer;

pub use analyzer::Analyzer;
